pub mod activity;
pub mod entry;
pub mod user;

pub use activity::{Activity, ActivityFull, ActivityPatch, ActivityView, NewActivity, RelatedActivity};
pub use entry::{Entry, EntryPatch, EntryView, NewEntry};
pub use user::{NewUser, User, UserFull, UserPatch, UserView};
