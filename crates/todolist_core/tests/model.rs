use chrono::{NaiveDate, NaiveDateTime};
use todolist_core::{
    hash_credential, Account, Accounts, ConsistencyIssue, ModelError, SequentialIds, Task,
    TaskList, ValidationError, DEFAULT_LIST_NAME, DEFAULT_TASK_TITLE,
};

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

#[test]
fn register_creates_immutable_default_list_with_welcome_task() {
    let ids = SequentialIds::new("id");
    let account = Account::register(&ids, "alice", "Secret123");

    assert_eq!(account.id(), "id-1");
    assert_eq!(account.name(), "alice");
    assert_eq!(account.email(), "");
    assert_eq!(account.task_lists().len(), 1);

    let default_list = account.default_list().unwrap();
    assert_eq!(default_list.name(), DEFAULT_LIST_NAME);
    assert!(!default_list.is_mutable());
    assert_eq!(default_list.len(), 1);
    assert_eq!(default_list.tasks()[0].title(), "Start using your TodoList");
    assert!(default_list.tasks()[0].due_at().is_none());
}

#[test]
fn register_stores_salted_hash_and_checks_login() {
    let ids = SequentialIds::new("id");
    let mut account = Account::register(&ids, "alice", "Secret123");

    assert_eq!(account.credential(), hash_credential("id-1", "Secret123"));
    assert_ne!(account.credential(), "Secret123");
    assert!(account.check_credential("Secret123"));
    assert!(!account.check_credential("secret123"));

    account.set_password("Changed456");
    assert!(account.check_credential("Changed456"));
    assert!(!account.check_credential("Secret123"));
}

#[test]
fn restore_keeps_fields_verbatim_and_starts_without_lists() {
    let account = Account::restore("u-9", "x", "H", "not-an-email");

    assert_eq!(account.id(), "u-9");
    assert_eq!(account.name(), "x");
    assert_eq!(account.credential(), "H");
    assert_eq!(account.email(), "not-an-email");
    assert!(account.task_lists().is_empty());
    assert!(account.default_list().is_none());
}

#[test]
fn set_email_rejects_invalid_addresses_without_mutation() {
    let mut account = Account::restore("u-1", "alice", "H", "a@x.com");

    let err = account.set_email("broken").unwrap_err();
    assert_eq!(err, ValidationError::InvalidEmail("broken".to_string()));
    assert_eq!(account.email(), "a@x.com");

    account.set_email("alice@example.org").unwrap();
    assert_eq!(account.email(), "alice@example.org");
}

#[test]
fn add_task_list_rejects_duplicate_names_without_mutation() {
    let ids = SequentialIds::new("id");
    let mut account = Account::register(&ids, "alice", "Secret123");

    assert!(account.add_task_list(TaskList::new_empty(&ids, "Work")));
    let before = account.clone();
    assert!(!account.add_task_list(TaskList::new_empty(&ids, "Work")));
    assert!(!account.add_task_list(TaskList::new_empty(&ids, DEFAULT_LIST_NAME)));
    assert_eq!(account, before);
}

#[test]
fn list_constructors_differ_in_welcome_task_seeding() {
    let ids = SequentialIds::new("id");

    let empty = TaskList::new_empty(&ids, "Work");
    assert!(empty.is_mutable());
    assert!(empty.is_empty());

    let seeded = TaskList::new_with_welcome_task(&ids, "Home", true);
    assert!(seeded.is_mutable());
    assert_eq!(seeded.len(), 1);
    assert_eq!(seeded.tasks()[0].comment(), "Add, delete and modify entries.");

    let restored = TaskList::restore("l-1", "Old", false);
    assert!(restored.is_empty());
    assert!(!restored.is_mutable());
}

#[test]
fn default_list_cannot_be_renamed_or_removed() {
    let ids = SequentialIds::new("id");
    let mut account = Account::register(&ids, "alice", "Secret123");

    assert_eq!(
        account.rename_task_list(DEFAULT_LIST_NAME, "Inbox"),
        Err(ModelError::ImmutableTaskList(DEFAULT_LIST_NAME.to_string()))
    );
    assert_eq!(
        account.remove_task_list(DEFAULT_LIST_NAME).unwrap_err(),
        ModelError::ImmutableTaskList(DEFAULT_LIST_NAME.to_string())
    );
    assert!(account.default_list().is_some());
}

#[test]
fn rename_and_remove_user_lists() {
    let ids = SequentialIds::new("id");
    let mut account = Account::register(&ids, "alice", "Secret123");
    account.add_task_list(TaskList::new_empty(&ids, "Work"));
    account.add_task_list(TaskList::new_empty(&ids, "Home"));

    assert_eq!(
        account.rename_task_list("Work", "Home"),
        Err(ModelError::DuplicateTaskList("Home".to_string()))
    );
    assert_eq!(
        account.rename_task_list("Nope", "Other"),
        Err(ModelError::TaskListNotFound("Nope".to_string()))
    );
    account.rename_task_list("Work", "Job").unwrap();
    assert!(account.task_list("Work").is_none());
    assert!(account.task_list("Job").is_some());

    let removed = account.remove_task_list("Home").unwrap();
    assert_eq!(removed.name(), "Home");
    let names: Vec<&str> = account.task_lists().iter().map(|l| l.name()).collect();
    assert_eq!(names, vec![DEFAULT_LIST_NAME, "Job"]);
}

#[test]
fn add_task_preserves_order_and_rejects_same_task_twice() {
    let ids = SequentialIds::new("id");
    let mut list = TaskList::new_empty(&ids, "Work");
    let first = Task::new(&ids, "first", "");
    let second = Task::new(&ids, "second", "");

    assert!(list.add_task(first.clone()));
    assert!(list.add_task(second));
    assert!(!list.add_task(first));
    let titles: Vec<&str> = list.tasks().iter().map(|t| t.title()).collect();
    assert_eq!(titles, vec!["first", "second"]);

    let third = Task::new(&ids, "third", "");
    let third_id = third.id().to_string();
    list.add_task(third);
    let second_id = list.tasks()[1].id().to_string();
    let removed = list.remove_task(&second_id).unwrap();
    assert_eq!(removed.title(), "second");
    assert_eq!(list.tasks()[1].id(), third_id);
    assert!(list.remove_task("missing").is_none());
}

#[test]
fn new_task_defaults() {
    let ids = SequentialIds::new("id");
    let task = Task::untitled(&ids);

    assert_eq!(task.title(), DEFAULT_TASK_TITLE);
    assert_eq!(task.comment(), "");
    assert!(!task.is_done());
    assert!(!task.is_starred());
    assert!(task.due_at().is_none());
    assert_eq!(task.due_time_text(), "00:00");
}

#[test]
fn set_due_date_parses_time_text() {
    let ids = SequentialIds::new("id");
    let mut task = Task::new(&ids, "Ship", "");
    let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

    task.set_due_date(day, "09:30").unwrap();
    assert_eq!(task.due_at(), Some(at(2024, 5, 1, 9, 30)));
    assert_eq!(task.due_time_text(), "09:30");

    task.set_due_date(day, "1745").unwrap();
    assert_eq!(task.due_at(), Some(at(2024, 5, 1, 17, 45)));

    task.set_due_date(day, "8:05:59").unwrap();
    assert_eq!(task.due_at(), Some(at(2024, 5, 1, 8, 5)));
}

#[test]
fn set_due_date_clamps_out_of_range_values() {
    let ids = SequentialIds::new("id");
    let mut task = Task::new(&ids, "Ship", "");
    let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

    task.set_due_date(day, "25:99").unwrap();
    assert_eq!(task.due_at(), Some(at(2024, 5, 1, 0, 0)));
}

#[test]
fn set_due_date_rejects_garbage_and_keeps_previous_value() {
    let ids = SequentialIds::new("id");
    let mut task = Task::new(&ids, "Ship", "");
    let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    task.set_due_date(day, "10:00").unwrap();

    let err = task.set_due_date(day, "abc").unwrap_err();
    assert_eq!(err, ValidationError::InvalidTimeText("abc".to_string()));
    assert_eq!(task.due_at(), Some(at(2024, 5, 1, 10, 0)));

    task.clear_due_date();
    assert!(task.due_at().is_none());
}

#[test]
fn restored_due_dates_are_truncated_to_minutes() {
    let precise = NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(9, 30, 42)
        .unwrap();
    let task = Task::restore("t-1", "Ship", "", Some(precise), true, true);

    assert_eq!(task.due_at(), Some(at(2024, 5, 1, 9, 30)));
    assert!(task.is_done());
    assert!(task.is_starred());
}

#[test]
fn accounts_insert_rejects_duplicate_names_without_mutation() {
    let mut accounts = Accounts::new();
    assert!(accounts.insert(Account::restore("u-1", "alice", "H1", "")));
    assert!(!accounts.insert(Account::restore("u-2", "alice", "H2", "")));

    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts.get("alice").unwrap().id(), "u-1");
}

#[test]
fn accounts_iterate_in_name_order() {
    let mut accounts = Accounts::new();
    accounts.insert(Account::restore("u-1", "carol", "H", ""));
    accounts.insert(Account::restore("u-2", "alice", "H", ""));
    accounts.insert(Account::restore("u-3", "bob", "H", ""));

    let names: Vec<&str> = accounts.iter().map(|a| a.name()).collect();
    assert_eq!(names, vec!["alice", "bob", "carol"]);
}

#[test]
fn accounts_register_validates_and_authenticates() {
    let ids = SequentialIds::new("id");
    let mut accounts = Accounts::new();

    assert_eq!(
        accounts.register(&ids, "al", "Secret123").unwrap_err(),
        ModelError::Validation(ValidationError::InvalidIdentifier("al".to_string()))
    );
    assert_eq!(
        accounts.register(&ids, "alice", "weak").unwrap_err(),
        ModelError::Validation(ValidationError::WeakPassword)
    );

    accounts.register(&ids, "alice", "Secret123").unwrap();
    assert_eq!(
        accounts.register(&ids, "alice", "Other123").unwrap_err(),
        ModelError::DuplicateAccount("alice".to_string())
    );

    assert!(accounts.authenticate("alice", "Secret123").is_some());
    assert!(accounts.authenticate("alice", "Other123").is_none());
    assert!(accounts.authenticate("bob", "Secret123").is_none());
}

#[test]
fn consistency_issues_report_restored_gaps() {
    let ids = SequentialIds::new("id");
    let mut accounts = Accounts::new();
    accounts.register(&ids, "alice", "Secret123").unwrap();
    accounts.insert(Account::restore("u-1", "b", "H", "nope"));
    let mut carol = Account::restore("u-2", "carol", "H", "");
    carol.add_task_list(TaskList::restore("l-1", DEFAULT_LIST_NAME, true));
    accounts.insert(carol);

    let issues = accounts.consistency_issues();
    assert_eq!(
        issues,
        vec![
            ConsistencyIssue::MissingDefaultList {
                account: "b".to_string()
            },
            ConsistencyIssue::InvalidAccountName {
                account: "b".to_string()
            },
            ConsistencyIssue::InvalidEmail {
                account: "b".to_string(),
                email: "nope".to_string()
            },
            ConsistencyIssue::MutableDefaultList {
                account: "carol".to_string()
            },
        ]
    );
}

#[test]
fn model_serialization_uses_expected_wire_fields() {
    let ids = SequentialIds::new("id");
    let mut task = Task::new(&ids, "Ship", "asap");
    task.set_starred(true);
    task.set_due_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), "9:30")
        .unwrap();

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["id"], "id-1");
    assert_eq!(json["title"], "Ship");
    assert_eq!(json["comment"], "asap");
    assert_eq!(json["done"], false);
    assert_eq!(json["starred"], true);
    assert_eq!(json["due_at"], "2024-05-01T09:30:00");

    let decoded: Task = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, task);
}
