use crate::api::attendance::{AttendanceListResponse, AttendanceQuery, AttendanceRow};
use crate::api::employee::{
    CreateEmployee, EmployeeListResponse, EmployeeQuery, EmployeeResponse, UpdateEmployee,
};
use crate::api::leave_request::{CreateLeave, LeaveFilter, LeaveListResponse, LeaveResponse};
use crate::model::employee::{AttendanceStatus, Role, SalaryInfo};
use crate::model::leave_request::{LeaveStatus, LeaveType};
use crate::models::{ChangePasswordReq, LoginReqDto};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Employee Management System API",
        version = "1.0.0",
        description = r#"
## Employee Management System (EMS)

This API powers an **Employee Management System** persisted to local storage
partitions, one JSON document per partition.

### 🔹 Key Features
- **Employee Directory**
  - Create accounts with auto-generated login IDs, view and update profiles
- **Authentication**
  - Login with login ID or email, single persisted session, password change
- **Attendance**
  - Daily check-in and check-out with lazy day rollover
- **Time Off**
  - Submit requests, approve/reject as admin, inclusive day allocation

### 📦 Response Format
- JSON-based RESTful responses
- The session account is established by `POST /auth/login` and consumed by
  every route under the protected prefix

---
Built with **Rust**, **Actix Web**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::attendance_status,
        crate::api::attendance::list_attendance,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee
    ),
    components(
        schemas(
            LoginReqDto,
            ChangePasswordReq,
            LeaveFilter,
            LeaveResponse,
            LeaveListResponse,
            CreateLeave,
            LeaveType,
            LeaveStatus,
            CreateEmployee,
            UpdateEmployee,
            EmployeeQuery,
            EmployeeResponse,
            EmployeeListResponse,
            SalaryInfo,
            Role,
            AttendanceStatus,
            AttendanceQuery,
            AttendanceRow,
            AttendanceListResponse
        )
    ),
    tags(
        (name = "Leave", description = "Leave management APIs"),
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Employee", description = "Employee management APIs"),
    )
)]
pub struct ApiDoc;
