use stash_client::{
    ClientSubscriber, ListingEvent, SessionEvent, StatusEvent,
};
use uuid::Uuid;

/// Renders client events on the terminal, playing the role the status
/// line and file list play in a graphical front end.
pub struct ConsoleSubscriber {
    id: String,
}

impl ConsoleSubscriber {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
        }
    }
}

impl Default for ConsoleSubscriber {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientSubscriber for ConsoleSubscriber {
    fn get_id(&self) -> String {
        self.id.clone()
    }

    fn notify_status(&self, event: StatusEvent) {
        println!("{}", event.message);
    }

    fn notify_session(&self, event: SessionEvent) {
        if event.authenticated {
            println!("Signed in. `upload` and `list` are available.");
        } else {
            println!("Signed out. Run `stash-cli login` to get started.");
        }
    }

    fn notify_listing(&self, event: ListingEvent) {
        match event {
            ListingEvent::Files(files) => {
                println!("Your files:");
                for file in files {
                    println!("  - {}", file.name);
                }
            }
            ListingEvent::Empty => {
                println!("Your files:");
                println!("No files uploaded yet.");
            }
            ListingEvent::LoginRequired => {
                println!("Please login to view your files.");
            }
            ListingEvent::Unavailable => {
                println!("Error fetching files. Please try again later.");
            }
        }
    }
}
