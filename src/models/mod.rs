pub mod event;
pub mod feedback;
pub mod host;
pub mod order;
pub mod participant;
pub mod resource;
pub mod student;
pub mod ticket;
pub mod venue;

pub use event::{Event, EventPatch, EventSummary};
pub use feedback::{Feedback, FeedbackDetail};
pub use host::Host;
pub use order::{Order, PaymentStatus};
pub use participant::{Participant, ParticipantDetail, RegistrationCount};
pub use resource::{MaintenanceWindow, Resource, ResourceBooking};
pub use student::Student;
pub use ticket::{Ticket, TicketPatch};
pub use venue::Venue;
