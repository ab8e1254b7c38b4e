//! Seeded in-memory tenant shared by the service unit tests.

use chrono::NaiveDate;

use crate::db::repositories::LocalRepository;
use crate::db::repository::ScheduleRepository;
use crate::models::*;

pub(crate) fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub(crate) fn t(h: u32, m: u32) -> TimeOfDay {
    TimeOfDay::new(h, m).unwrap()
}

pub(crate) struct World {
    pub repo: LocalRepository,
    pub tenant: TenantId,
    pub site: Site,
    pub team: Team,
    pub day_shift: Shift,
    pub night_shift: Shift,
    pub alice: Employee,
    pub bob: Employee,
}

impl World {
    /// Tenant with default settings, one site, one team, a day shift
    /// (08:00-16:00), a night shift (22:00-06:00) and two employees.
    pub fn new() -> Self {
        Self::with_settings(TenantSettings::default())
    }

    pub fn with_settings(settings: TenantSettings) -> Self {
        let repo = LocalRepository::new();
        let tenant = TenantId::generate();
        repo.add_tenant(Tenant {
            id: tenant,
            name: "Acme".to_string(),
            settings,
        });

        let site = Site {
            id: SiteId::generate(),
            tenant_id: tenant,
            name: "Siège".to_string(),
            code: Some("HQ".to_string()),
            working_days: None,
        };
        repo.add_site(site.clone());

        let team = Team {
            id: TeamId::generate(),
            tenant_id: tenant,
            name: "Équipe A".to_string(),
            code: "TEAM001".to_string(),
            rotation_enabled: true,
        };
        repo.add_team(team.clone());

        let day_shift = shift(tenant, "M", "Matin", t(8, 0), t(16, 0), false);
        let night_shift = shift(tenant, "N", "Nuit", t(22, 0), t(6, 0), true);
        repo.add_shift(day_shift.clone());
        repo.add_shift(night_shift.clone());

        let alice = employee(&repo, tenant, &site, &team, "EMP001", "Alice", "Martin");
        let bob = employee(&repo, tenant, &site, &team, "EMP002", "Bob", "Durand");

        Self {
            repo,
            tenant,
            site,
            team,
            day_shift,
            night_shift,
            alice,
            bob,
        }
    }

    pub fn add_employee(&self, matricule: &str, first: &str, last: &str) -> Employee {
        employee(&self.repo, self.tenant, &self.site, &self.team, matricule, first, last)
    }

    pub fn add_leave(&self, employee: &Employee, start: NaiveDate, end: NaiveDate, status: LeaveStatus) {
        self.repo.add_leave(Leave {
            id: LeaveId::generate(),
            tenant_id: self.tenant,
            employee_id: employee.id,
            leave_type: Some("CP".to_string()),
            start_date: start,
            end_date: end,
            status,
        });
    }

    pub fn add_recovery_day(&self, employee: &Employee, date: NaiveDate, status: RecoveryDayStatus) {
        self.repo.add_recovery_day(RecoveryDay {
            id: RecoveryDayId::generate(),
            tenant_id: self.tenant,
            employee_id: employee.id,
            start_date: date,
            end_date: date,
            status,
        });
    }

    pub fn add_holiday(&self, date: NaiveDate, name: &str) {
        self.repo.add_holiday(Holiday::new(self.tenant, date, name));
    }

    pub async fn plan(&self, employee: &Employee, shift: &Shift, date: NaiveDate) -> Schedule {
        self.repo
            .insert_schedule(Schedule::new(self.tenant, employee.id, shift.id, date))
            .await
            .unwrap()
    }

    pub fn shift(&self, code: &str, start: TimeOfDay, end: TimeOfDay, night: bool) -> Shift {
        let s = shift(self.tenant, code, code, start, end, night);
        self.repo.add_shift(s.clone());
        s
    }
}

fn shift(
    tenant: TenantId,
    code: &str,
    name: &str,
    start: TimeOfDay,
    end: TimeOfDay,
    night: bool,
) -> Shift {
    Shift {
        id: ShiftId::generate(),
        tenant_id: tenant,
        code: code.to_string(),
        name: name.to_string(),
        start_time: start,
        end_time: end,
        break_minutes: 0,
        is_night_shift: night,
    }
}

fn employee(
    repo: &LocalRepository,
    tenant: TenantId,
    site: &Site,
    team: &Team,
    matricule: &str,
    first: &str,
    last: &str,
) -> Employee {
    let employee = Employee {
        id: EmployeeId::generate(),
        tenant_id: tenant,
        matricule: matricule.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        position: None,
        site_id: Some(site.id),
        department_id: None,
        team_id: Some(team.id),
        current_shift_id: None,
        is_active: true,
    };
    repo.add_employee(employee.clone());
    employee
}
