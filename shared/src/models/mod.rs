//! Domain models shared between the server and its clients

pub mod comment;
pub mod event;
pub mod role;
pub mod ticket;
pub mod user;

pub use comment::{Comment, CommentNode, CommentView};
pub use event::{EventPayload, TicketEvent, TimelineEntry};
pub use role::Role;
pub use ticket::{Ticket, TicketDetail, TicketPage, TicketPriority, TicketStatus, TicketSummary};
pub use user::{PublicUser, TeamMember, UserSummary};
