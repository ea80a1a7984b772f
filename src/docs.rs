use crate::api::employee::AssignManager;
use crate::api::holiday::CreateHoliday;
use crate::api::leave_request::{ApplyLeave, DecideLeave, LeaveResponse, LeaveTypeInfo};
use crate::leave::lifecycle::Decision;
use crate::model::employee::Employee;
use crate::model::holiday::Holiday;
use crate::model::leave_request::{LeaveStatus, LeaveType};
use crate::models::{LoginReq, RegisterReq};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Management API",
        version = "1.0.0",
        description = r#"
## Leave Management System

This API lets employees submit leave requests and managers approve, decline,
or report on their subordinates' requests.

### Key Features
- **Leave requests**
  - Apply for leave with working-day and quota validation
  - Approve/decline as a manager, cancel as the owner
- **Reporting**
  - Leave history, pending queues, and reports per employee or manager
- **Holidays**
  - Registered holidays excluded from working-day counts

### Security
Protected endpoints use **JWT Bearer authentication**. Manager-only
operations additionally require the manager flag.
"#,
    ),
    paths(
        crate::api::leave_request::apply_leave,
        crate::api::leave_request::decide_leave,
        crate::api::leave_request::cancel_leave,
        crate::api::leave_request::leave_history,
        crate::api::leave_request::pending_requests,
        crate::api::leave_request::manager_history,
        crate::api::leave_request::manager_report,
        crate::api::leave_request::employee_report,
        crate::api::leave_request::leave_types,

        crate::api::employee::current_user,
        crate::api::employee::list_subordinates,
        crate::api::employee::assign_manager,

        crate::api::holiday::list_holidays,
        crate::api::holiday::create_holiday,
    ),
    components(
        schemas(
            ApplyLeave,
            DecideLeave,
            Decision,
            LeaveResponse,
            LeaveTypeInfo,
            LeaveType,
            LeaveStatus,
            AssignManager,
            Employee,
            Holiday,
            CreateHoliday,
            RegisterReq,
            LoginReq
        )
    ),
    tags(
        (name = "Leave", description = "Leave request APIs"),
        (name = "Employee", description = "Employee and manager-relation APIs"),
        (name = "Holiday", description = "Holiday registry APIs"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
