pub mod appointment;
pub mod job;
pub mod notification;
pub mod user;

pub use appointment::PgAppointmentStore;
pub use job::PgJobBackend;
pub use notification::PgNotificationStore;
pub use user::PgUserDirectory;
