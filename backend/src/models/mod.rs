pub mod absence;
pub mod calendar;
pub mod macros;
pub mod organization;
pub mod schedule;

pub use absence::*;
pub use calendar::TimeOfDay;
pub use organization::*;
pub use schedule::*;

crate::define_id_type!(TenantId);
crate::define_id_type!(SiteId);
crate::define_id_type!(DepartmentId);
crate::define_id_type!(TeamId);
crate::define_id_type!(EmployeeId);
crate::define_id_type!(ShiftId);
crate::define_id_type!(ScheduleId);
crate::define_id_type!(HolidayId);
crate::define_id_type!(LeaveId);
crate::define_id_type!(RecoveryDayId);
crate::define_id_type!(ReplacementId);
crate::define_id_type!(UserId);
