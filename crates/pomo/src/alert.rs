//! Segment-end alerts through pomo-notify

use pomo_notify::{Notification, Urgency};

use crate::segment::Segment;
use crate::timer::{Notifier, Transition};

/// Build the notification shown when a segment ends
pub fn notification_for(transition: &Transition) -> Notification {
    match transition.finished {
        Segment::Focus => {
            let done = match transition.completed {
                Some(count) => format!("Focus segment {} done.", count),
                None => "Focus segment done.".to_string(),
            };
            let next = transition.next.label().to_lowercase();
            Notification::new(format!("{} Time for a {}.", done, next))
                .with_title("Focus complete")
                .with_urgency(Urgency::Normal)
                .with_timeout(10)
        }
        Segment::ShortBreak | Segment::LongBreak => {
            Notification::new(format!("{} over. Back to focus.", transition.finished.label()))
                .with_title("Break over")
                .with_urgency(Urgency::Normal)
                .with_timeout(10)
        }
    }
}

/// Desktop notification plus chime, fired off the event loop
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn segment_finished(&mut self, transition: &Transition) {
        let notification = notification_for(transition);
        // Backends shell out and wait; keep that off the timer's thread
        let _ = tokio::task::spawn_blocking(move || pomo_notify::alert(&notification));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_message_names_next_break() {
        let n = notification_for(&Transition {
            finished: Segment::Focus,
            next: Segment::LongBreak,
            completed: Some(4),
        });
        assert_eq!(n.title, "Focus complete");
        assert_eq!(n.message, "Focus segment 4 done. Time for a long break.");
        assert!(n.sound);
    }

    #[test]
    fn test_break_message() {
        let n = notification_for(&Transition {
            finished: Segment::ShortBreak,
            next: Segment::Focus,
            completed: None,
        });
        assert_eq!(n.title, "Break over");
        assert_eq!(n.message, "Short Break over. Back to focus.");
    }
}
