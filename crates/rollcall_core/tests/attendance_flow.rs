use chrono::NaiveDate;
use rollcall_core::db::open_db_in_memory;
use rollcall_core::service::attendance_service::{
    AttendanceService, AttendanceSubmission, SaveOutcome,
};
use rollcall_core::service::stage_service::StageService;
use rollcall_core::service::student_service::{NewStudent, StudentService};
use rollcall_core::{
    AttendanceValidationError, DaySchedule, EntityId, KvSchoolRepository, Lecture, SchoolConfig,
    SchoolRepository, ServiceError, SqliteKvStore,
};
use rusqlite::Connection;

fn repo(conn: &Connection) -> KvSchoolRepository<SqliteKvStore<'_>> {
    KvSchoolRepository::new(SqliteKvStore::try_new(conn).unwrap())
}

/// Schedules `subjects` on Sunday for `stage_id`.
fn schedule(conn: &Connection, stage_id: EntityId, subjects: &[&str]) {
    let repo = repo(conn);
    let mut schedules = repo.schedules().unwrap();
    schedules.push(DaySchedule {
        id: repo.next_id().unwrap(),
        stage_id,
        day: "Sunday".to_string(),
        lectures: subjects
            .iter()
            .map(|subject| Lecture::new(*subject, 1, "09:00"))
            .collect(),
    });
    repo.set_schedules(&schedules).unwrap();
}

fn enroll(conn: &Connection, stage_id: EntityId, names: &[&str]) -> Vec<EntityId> {
    let service = StudentService::new(repo(conn));
    names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            service
                .add_student(&NewStudent {
                    name: name.to_string(),
                    university_id: format!("U-{stage_id}-{index}"),
                    stage_id,
                })
                .unwrap()
                .id
        })
        .collect()
}

fn submission(stage_id: EntityId, subject: &str, present: Vec<EntityId>) -> AttendanceSubmission {
    AttendanceSubmission {
        date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
        stage_id,
        day: "Sunday".to_string(),
        subject: subject.to_string(),
        present_student_ids: present,
    }
}

#[test]
fn unticked_roster_members_are_recorded_absent() {
    let conn = open_db_in_memory().unwrap();
    let stage = StageService::new(repo(&conn)).add_stage("Stage One").unwrap();
    schedule(&conn, stage.id, &["Math", "Physics"]);
    let ids = enroll(&conn, stage.id, &["Ali", "Sara", "Huda"]);
    let service = AttendanceService::new(repo(&conn));

    let (record, outcome) = service
        .record_attendance(&submission(stage.id, "Math", vec![ids[2], ids[0]]))
        .unwrap();

    assert_eq!(outcome, SaveOutcome::Created);
    assert_eq!(record.present_student_ids, vec![ids[0], ids[2]]);
    assert_eq!(record.absent_student_ids, vec![ids[1]]);
    assert_eq!(service.list_attendance().unwrap(), vec![record]);
}

#[test]
fn resubmitting_same_lecture_replaces_record_in_place() {
    let conn = open_db_in_memory().unwrap();
    let stage = StageService::new(repo(&conn)).add_stage("Stage One").unwrap();
    schedule(&conn, stage.id, &["Math", "Physics"]);
    let ids = enroll(&conn, stage.id, &["Ali", "Sara"]);
    let service = AttendanceService::new(repo(&conn));

    let (first, _) = service
        .record_attendance(&submission(stage.id, "Math", vec![]))
        .unwrap();
    service
        .record_attendance(&submission(stage.id, "Physics", vec![ids[0]]))
        .unwrap();
    let (replaced, outcome) = service
        .record_attendance(&submission(stage.id, " Math ", ids.clone()))
        .unwrap();

    assert_eq!(outcome, SaveOutcome::Replaced);
    assert_eq!(replaced.id, first.id);
    let records = service.list_attendance().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], replaced);
    assert_eq!(records[0].present_student_ids, ids);
    assert!(records[0].absent_student_ids.is_empty());
}

#[test]
fn different_dates_create_separate_records() {
    let conn = open_db_in_memory().unwrap();
    let stage = StageService::new(repo(&conn)).add_stage("Stage One").unwrap();
    schedule(&conn, stage.id, &["Math", "Physics"]);
    enroll(&conn, stage.id, &["Ali"]);
    let service = AttendanceService::new(repo(&conn));

    service
        .record_attendance(&submission(stage.id, "Math", vec![]))
        .unwrap();
    let mut next_week = submission(stage.id, "Math", vec![]);
    next_week.date = NaiveDate::from_ymd_opt(2024, 3, 17).unwrap();
    let (_, outcome) = service.record_attendance(&next_week).unwrap();

    assert_eq!(outcome, SaveOutcome::Created);
    assert_eq!(service.list_attendance().unwrap().len(), 2);
}

#[test]
fn empty_roster_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let stage = StageService::new(repo(&conn)).add_stage("Stage One").unwrap();
    schedule(&conn, stage.id, &["Math", "Physics"]);
    let service = AttendanceService::new(repo(&conn));

    assert!(matches!(
        service.record_attendance(&submission(stage.id, "Math", vec![])),
        Err(ServiceError::EmptyRoster(id)) if id == stage.id
    ));
    assert!(service.list_attendance().unwrap().is_empty());
}

#[test]
fn present_ids_must_belong_to_the_roster() {
    let conn = open_db_in_memory().unwrap();
    let stage_one = StageService::new(repo(&conn)).add_stage("Stage One").unwrap();
    schedule(&conn, stage_one.id, &["Math", "Physics"]);
    let stage_two = StageService::new(repo(&conn)).add_stage("Stage Two").unwrap();
    let ids = enroll(&conn, stage_one.id, &["Ali"]);
    let outsider = enroll(&conn, stage_two.id, &["Zaid"])[0];
    let service = AttendanceService::new(repo(&conn));

    assert!(matches!(
        service.record_attendance(&submission(stage_one.id, "Math", vec![outsider])),
        Err(ServiceError::InvalidAttendance(AttendanceValidationError::NotOnRoster(id))) if id == outsider
    ));
    assert!(matches!(
        service.record_attendance(&submission(stage_one.id, "Math", vec![ids[0], ids[0]])),
        Err(ServiceError::InvalidAttendance(AttendanceValidationError::DuplicateStudent(_)))
    ));
    assert!(service.list_attendance().unwrap().is_empty());
}

#[test]
fn unknown_stage_and_blank_subject_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let stage = StageService::new(repo(&conn)).add_stage("Stage One").unwrap();
    schedule(&conn, stage.id, &["Math", "Physics"]);
    enroll(&conn, stage.id, &["Ali"]);
    let service = AttendanceService::new(repo(&conn));

    assert!(matches!(
        service.record_attendance(&submission(stage.id + 100, "Math", vec![])),
        Err(ServiceError::NotFound { entity: "stage", .. })
    ));
    assert!(matches!(
        service.record_attendance(&submission(stage.id, "  ", vec![])),
        Err(ServiceError::InvalidInput("subject"))
    ));
}

#[test]
fn subject_and_day_are_normalized_to_the_scheduled_lecture() {
    let conn = open_db_in_memory().unwrap();
    let stage = StageService::new(repo(&conn)).add_stage("Stage One").unwrap();
    schedule(&conn, stage.id, &["Data Structures"]);
    enroll(&conn, stage.id, &["Ali"]);
    let service = AttendanceService::new(repo(&conn));

    let mut spaced = submission(stage.id, "Data  Structures", vec![]);
    spaced.day = " Sunday ".to_string();
    let (first, _) = service.record_attendance(&spaced).unwrap();
    let (second, outcome) = service
        .record_attendance(&submission(stage.id, "Data Structures", vec![]))
        .unwrap();

    assert_eq!(first.subject, "Data Structures");
    assert_eq!(first.day, "Sunday");
    assert_eq!(outcome, SaveOutcome::Replaced);
    assert_eq!(second.id, first.id);
    assert_eq!(service.list_attendance().unwrap().len(), 1);
}

#[test]
fn attendance_requires_a_scheduled_lecture() {
    let conn = open_db_in_memory().unwrap();
    let stage = StageService::new(repo(&conn)).add_stage("Stage One").unwrap();
    schedule(&conn, stage.id, &["Data Structures"]);
    enroll(&conn, stage.id, &["Ali"]);
    let service = AttendanceService::new(repo(&conn));

    assert!(matches!(
        service.record_attendance(&submission(stage.id, "Basket Weaving", vec![])),
        Err(ServiceError::LectureNotFound { .. })
    ));
    let mut monday = submission(stage.id, "Data Structures", vec![]);
    monday.day = "Monday".to_string();
    assert!(matches!(
        service.record_attendance(&monday),
        Err(ServiceError::LectureNotFound { .. })
    ));
    let mut blank_day = submission(stage.id, "Data Structures", vec![]);
    blank_day.day = "  ".to_string();
    assert!(matches!(
        service.record_attendance(&blank_day),
        Err(ServiceError::InvalidInput("day"))
    ));
    let mut friday = submission(stage.id, "Data Structures", vec![]);
    friday.day = "Friday".to_string();
    assert!(matches!(
        service.record_attendance(&friday),
        Err(ServiceError::NotAWorkingDay(day)) if day == "Friday"
    ));
    assert!(service.list_attendance().unwrap().is_empty());
}

#[test]
fn holidays_reject_attendance() {
    let conn = open_db_in_memory().unwrap();
    let stage = StageService::new(repo(&conn)).add_stage("Stage One").unwrap();
    schedule(&conn, stage.id, &["Math"]);
    enroll(&conn, stage.id, &["Ali"]);
    let holiday = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    repo(&conn)
        .set_config(&SchoolConfig {
            holidays: vec![holiday],
            ..SchoolConfig::default()
        })
        .unwrap();
    let service = AttendanceService::new(repo(&conn));

    assert!(matches!(
        service.record_attendance(&submission(stage.id, "Math", vec![])),
        Err(ServiceError::Holiday(date)) if date == holiday
    ));
    assert!(service.list_attendance().unwrap().is_empty());
}
