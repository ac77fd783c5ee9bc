use rollcall_core::db::open_db_in_memory;
use rollcall_core::service::instructor_service::{InstructorService, NewInstructor};
use rollcall_core::service::schedule_service::{NewLecture, ScheduleService};
use rollcall_core::service::stage_service::StageService;
use rollcall_core::{
    EntityId, Instructor, KvSchoolRepository, SchoolConfig, SchoolRepository, ServiceError,
    SqliteKvStore,
};
use rusqlite::Connection;

fn repo(conn: &Connection) -> KvSchoolRepository<SqliteKvStore<'_>> {
    KvSchoolRepository::new(SqliteKvStore::try_new(conn).unwrap())
}

fn setup(conn: &Connection) -> (EntityId, Instructor) {
    let stage = StageService::new(repo(conn)).add_stage("Stage One").unwrap();
    let instructor = InstructorService::new(repo(conn))
        .add_instructor(&NewInstructor {
            name: "Dr. Ahmed Ali".to_string(),
            department: "Computer Engineering".to_string(),
            username: "ahmed".to_string(),
            password: "password".to_string(),
        })
        .unwrap();
    (stage.id, instructor)
}

fn lecture(stage_id: EntityId, day: &str, subject: &str, instructor_id: EntityId) -> NewLecture {
    NewLecture {
        stage_id,
        day: day.to_string(),
        subject: subject.to_string(),
        instructor_id,
        time: "09:00".to_string(),
    }
}

#[test]
fn weekly_schedule_lists_working_days_in_order() {
    let conn = open_db_in_memory().unwrap();
    let (stage_id, instructor) = setup(&conn);
    let service = ScheduleService::new(repo(&conn));

    service
        .add_lecture(&lecture(stage_id, "Tuesday", "Physics", instructor.id))
        .unwrap();
    service
        .add_lecture(&lecture(stage_id, "Sunday", "Math", instructor.id))
        .unwrap();

    let week = service.weekly_schedule(stage_id).unwrap();
    let days: Vec<&str> = week.days.iter().map(|day| day.day.as_str()).collect();
    assert_eq!(
        days,
        vec!["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday"]
    );
    assert_eq!(week.days[0].lectures[0].subject, "Math");
    assert_eq!(
        week.days[0].lectures[0].instructor_name.as_deref(),
        Some("Dr. Ahmed Ali")
    );
    assert!(week.days[1].lectures.is_empty());
    assert_eq!(week.days[2].lectures[0].subject, "Physics");
    assert!(!week.is_empty());
}

#[test]
fn add_lecture_creates_one_day_schedule_per_stage_and_day() {
    let conn = open_db_in_memory().unwrap();
    let (stage_id, instructor) = setup(&conn);
    let service = ScheduleService::new(repo(&conn));

    service
        .add_lecture(&lecture(stage_id, "Sunday", "Math", instructor.id))
        .unwrap();
    service
        .add_lecture(&lecture(stage_id, "Sunday", "Physics", instructor.id))
        .unwrap();

    let schedules = repo(&conn).schedules().unwrap();
    assert_eq!(schedules.len(), 1);
    assert_eq!(schedules[0].lectures.len(), 2);
}

#[test]
fn add_lecture_rejects_invalid_requests() {
    let conn = open_db_in_memory().unwrap();
    let (stage_id, instructor) = setup(&conn);
    let service = ScheduleService::new(repo(&conn));
    service
        .add_lecture(&lecture(stage_id, "Sunday", "Math", instructor.id))
        .unwrap();

    assert!(matches!(
        service.add_lecture(&lecture(stage_id, "Sunday", "Math", instructor.id)),
        Err(ServiceError::DuplicateLecture { .. })
    ));
    assert!(matches!(
        service.add_lecture(&lecture(stage_id, "Friday", "Math", instructor.id)),
        Err(ServiceError::NotAWorkingDay(day)) if day == "Friday"
    ));
    assert!(matches!(
        service.add_lecture(&lecture(stage_id, "Monday", "Math", instructor.id + 100)),
        Err(ServiceError::NotFound { entity: "instructor", .. })
    ));
    assert!(matches!(
        service.add_lecture(&lecture(stage_id + 100, "Monday", "Math", instructor.id)),
        Err(ServiceError::NotFound { entity: "stage", .. })
    ));
    assert!(matches!(
        service.add_lecture(&lecture(stage_id, "Monday", "  ", instructor.id)),
        Err(ServiceError::InvalidInput("subject"))
    ));
}

#[test]
fn configured_working_days_drive_the_week() {
    let conn = open_db_in_memory().unwrap();
    let (stage_id, instructor) = setup(&conn);
    repo(&conn)
        .set_config(&SchoolConfig {
            working_days: vec!["Monday".to_string(), "Friday".to_string()],
            holidays: Vec::new(),
        })
        .unwrap();
    let service = ScheduleService::new(repo(&conn));

    service
        .add_lecture(&lecture(stage_id, "Friday", "Math", instructor.id))
        .unwrap();

    let week = service.weekly_schedule(stage_id).unwrap();
    let days: Vec<&str> = week.days.iter().map(|day| day.day.as_str()).collect();
    assert_eq!(days, vec!["Monday", "Friday"]);
}

#[test]
fn delete_lecture_removes_only_the_named_subject() {
    let conn = open_db_in_memory().unwrap();
    let (stage_id, instructor) = setup(&conn);
    let service = ScheduleService::new(repo(&conn));
    service
        .add_lecture(&lecture(stage_id, "Sunday", "Math", instructor.id))
        .unwrap();
    service
        .add_lecture(&lecture(stage_id, "Sunday", "Physics", instructor.id))
        .unwrap();

    service.delete_lecture(stage_id, "Sunday", "Math").unwrap();

    let week = service.weekly_schedule(stage_id).unwrap();
    let subjects: Vec<&str> = week.days[0]
        .lectures
        .iter()
        .map(|lecture| lecture.subject.as_str())
        .collect();
    assert_eq!(subjects, vec!["Physics"]);
    assert!(matches!(
        service.delete_lecture(stage_id, "Sunday", "Math"),
        Err(ServiceError::LectureNotFound { .. })
    ));
}

#[test]
fn update_next_topic_is_visible_to_students() {
    let conn = open_db_in_memory().unwrap();
    let (stage_id, instructor) = setup(&conn);
    let service = ScheduleService::new(repo(&conn));
    service
        .add_lecture(&lecture(stage_id, "Monday", "Math", instructor.id))
        .unwrap();

    let updated = service
        .update_next_topic(stage_id, "Monday", "Math", "  Derivatives ")
        .unwrap();

    assert_eq!(updated.next_topic, "Derivatives");
    let week = service.weekly_schedule(stage_id).unwrap();
    assert_eq!(week.days[1].lectures[0].next_topic, "Derivatives");
    assert!(matches!(
        service.update_next_topic(stage_id, "Monday", "Chemistry", "x"),
        Err(ServiceError::LectureNotFound { .. })
    ));
}

#[test]
fn lectures_for_instructor_filters_by_assignment() {
    let conn = open_db_in_memory().unwrap();
    let (stage_id, instructor) = setup(&conn);
    let other = InstructorService::new(repo(&conn))
        .add_instructor(&NewInstructor {
            name: "Fatima Hassan".to_string(),
            department: "Software Engineering".to_string(),
            username: "fatima".to_string(),
            password: "password".to_string(),
        })
        .unwrap();
    let service = ScheduleService::new(repo(&conn));
    service
        .add_lecture(&lecture(stage_id, "Sunday", "Math", instructor.id))
        .unwrap();
    service
        .add_lecture(&lecture(stage_id, "Monday", "Physics", other.id))
        .unwrap();

    let assigned = service.lectures_for_instructor(other.id).unwrap();

    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].day, "Monday");
    assert_eq!(assigned[0].stage_id, stage_id);
    assert_eq!(assigned[0].lecture.subject, "Physics");
}
