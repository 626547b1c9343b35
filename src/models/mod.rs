pub mod actor;
pub mod audit;
pub mod group;
pub mod lesson;
pub mod teacher;
pub mod template;
pub mod week;

pub use actor::{Actor, Role};
pub use audit::AuditRecord;
pub use group::{Group, NewGroupRequest};
pub use lesson::{Lesson, LessonInput, Parity};
pub use teacher::{NewTeacherRequest, Teacher};
pub use template::LessonTemplate;
pub use week::WeekInfo;
