use crate::api::attendance::{
    AttendanceFilter, AttendanceListResponse, IndividualReport, IndividualReportQuery, RankRow,
    RecordScan, ReplayScan, ReportSummary,
};
use crate::api::dashboard::{ChartPoint, DashboardPercentages, DashboardSummary};
use crate::api::device::{CreateDevice, DeviceListResponse, UpdateDevice};
use crate::api::division::{CreateDivision, DivisionListResponse};
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeListRow};
use crate::api::monitor::ScanContent;
use crate::api::office::{CreateOffice, OfficeListResponse};
use crate::api::on_leave::{CreateLeave, LeaveListResponse, LeaveType};
use crate::api::unknown_serial::{UnknownSerialListResponse, UpdateUnknownSerial};
use crate::model::attendance::{Attendance, AttendanceCategory, CheckInStatus, CheckOutStatus};
use crate::model::device::{Device, DeviceStatus};
use crate::model::division::{Division, DivisionWithOffice};
use crate::model::employee::Employee;
use crate::model::office::Office;
use crate::model::on_leave::OnLeave;
use crate::model::unknown_serial::{UnknownSerial, UnknownSerialStatus};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Tracking System API",
        version = "1.0.0",
        description = r#"
## Attendance Tracking System

This API records badge-scan attendance events for organizations with multiple
offices and divisions, and exposes the management surface around them.

### 🔹 Key Features
- **Scan ingestion**
  - oneM2M broker relay endpoint, check-in/check-out classification,
    discipline categories, unknown-badge review queue
- **Employee / Office / Division / Device management**
  - Full CRUD with pagination and search
- **Leave tracking**
  - Leave periods feeding the dashboard headcount
- **Reporting**
  - Attendance lists, individual monthly reports, discipline ranking,
    dashboard summary and chart series

### 🔐 Security
Most endpoints are protected using **JWT Bearer authentication**.
Mutating operations require the **Admin** (or **Supervisor**) role; scan
ingestion is reserved for machine accounts.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::monitor::get_monitor,
        crate::api::monitor::post_monitor,

        crate::api::attendance::record_scan,
        crate::api::attendance::replay_scan,
        crate::api::attendance::list_attendances,
        crate::api::attendance::today_attendance,
        crate::api::attendance::get_attendance,
        crate::api::attendance::individual_report,
        crate::api::attendance::rank_attendance,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::supervised_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::office::create_office,
        crate::api::office::list_offices,
        crate::api::office::get_office,
        crate::api::office::update_office,
        crate::api::office::delete_office,

        crate::api::division::create_division,
        crate::api::division::list_divisions,
        crate::api::division::get_division,
        crate::api::division::divisions_by_office,
        crate::api::division::update_division,
        crate::api::division::delete_division,

        crate::api::device::create_device,
        crate::api::device::list_devices,
        crate::api::device::get_device,
        crate::api::device::update_device,
        crate::api::device::delete_device,

        crate::api::on_leave::create_leave,
        crate::api::on_leave::list_leaves,
        crate::api::on_leave::get_leave,
        crate::api::on_leave::delete_leave,

        crate::api::unknown_serial::list_unknown_serials,
        crate::api::unknown_serial::get_unknown_serial,
        crate::api::unknown_serial::update_unknown_serial,
        crate::api::unknown_serial::delete_unknown_serial,

        crate::api::dashboard::summary,
        crate::api::dashboard::chart
    ),
    components(
        schemas(
            Attendance,
            CheckInStatus,
            CheckOutStatus,
            AttendanceCategory,
            AttendanceFilter,
            AttendanceListResponse,
            RecordScan,
            ReplayScan,
            IndividualReport,
            IndividualReportQuery,
            ReportSummary,
            RankRow,
            ScanContent,
            Employee,
            CreateEmployee,
            EmployeeListRow,
            EmployeeListResponse,
            Office,
            CreateOffice,
            OfficeListResponse,
            Division,
            DivisionWithOffice,
            CreateDivision,
            DivisionListResponse,
            Device,
            DeviceStatus,
            CreateDevice,
            UpdateDevice,
            DeviceListResponse,
            OnLeave,
            CreateLeave,
            LeaveType,
            LeaveListResponse,
            UnknownSerial,
            UnknownSerialStatus,
            UpdateUnknownSerial,
            UnknownSerialListResponse,
            ChartPoint,
            DashboardPercentages,
            DashboardSummary
        )
    ),
    tags(
        (name = "Monitor", description = "M2M broker relay endpoint"),
        (name = "Attendance", description = "Attendance recording and reporting APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Office", description = "Office management APIs"),
        (name = "Division", description = "Division management APIs"),
        (name = "Device", description = "Scan device management APIs"),
        (name = "OnLeave", description = "Leave tracking APIs"),
        (name = "UnknownSerial", description = "Unknown badge review APIs"),
        (name = "Dashboard", description = "Aggregate reporting APIs"),
    )
)]
pub struct ApiDoc;
