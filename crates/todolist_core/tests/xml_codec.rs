use chrono::{NaiveDate, NaiveDateTime};
use todolist_core::{
    Account, Accounts, Codec, CodecConfig, DecodeError, MarkupCodec, SequentialIds, Task,
    TaskList, DEFAULT_LIST_NAME, DEFAULT_TASK_TITLE,
};

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn utc_codec() -> MarkupCodec {
    MarkupCodec::with_config(CodecConfig::utc())
}

fn decode_text(text: &str) -> Result<Accounts, DecodeError> {
    utc_codec().decode(text.as_bytes())
}

fn decode_reason(text: &str) -> String {
    let err = decode_text(text).unwrap_err();
    match &err {
        DecodeError::InvalidRecord { line, .. } => assert_eq!(*line, None),
    }
    err.reason().to_string()
}

fn sample_accounts() -> Accounts {
    let ids = SequentialIds::new("id");
    let mut accounts = Accounts::new();

    let alice = accounts.register(&ids, "alice", "Secret123").unwrap();
    alice.set_email("alice@example.org").unwrap();
    let mut work = TaskList::new_empty(&ids, "Work & <Play>");
    let mut ship = Task::new(&ids, "  Ship \"it\" 'now'  ", "line one\nline two");
    ship.set_starred(true);
    ship.set_due_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), "09:30")
        .unwrap();
    work.add_task(ship);
    let mut done = Task::new(&ids, "", "");
    done.set_done(true);
    work.add_task(done);
    alice.add_task_list(work);

    accounts.register(&ids, "bob_2", "Passw0rdX").unwrap();
    accounts
}

#[test]
fn encodes_nested_elements() {
    let ids = SequentialIds::new("t");
    let mut alice = Account::restore("u-1", "alice", "H", "a@x.com");
    let mut list = TaskList::restore("l-1", DEFAULT_LIST_NAME, false);
    let mut due = Task::new(&ids, "Ship", "");
    due.set_starred(true);
    due.set_due_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), "9:30")
        .unwrap();
    list.add_task(due);
    list.add_task(Task::new(&ids, "Later", "a < b"));
    alice.add_task_list(list);
    let mut accounts = Accounts::new();
    accounts.insert(alice);

    let text = String::from_utf8(utc_codec().encode(&accounts).unwrap()).unwrap();
    let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<todolistapp>
  <user>
    <username>alice</username>
    <password>H</password>
    <uuid>u-1</uuid>
    <email>a@x.com</email>
    <TodoList changeable="false">
      <name>Default</name>
      <uuid>l-1</uuid>
      <item starred="true" done="false">
        <title>Ship</title>
        <uuid>t-1</uuid>
        <comment></comment>
        <duedate>20240501T09:30:00+0000</duedate>
      </item>
      <item starred="false" done="false">
        <title>Later</title>
        <uuid>t-2</uuid>
        <comment>a &lt; b</comment>
      </item>
    </TodoList>
  </user>
</todolistapp>
"#;
    assert_eq!(text, expected);
}

#[test]
fn round_trip_reproduces_the_model() {
    let accounts = sample_accounts();
    let codec = utc_codec();

    let decoded = codec.decode(&codec.encode(&accounts).unwrap()).unwrap();

    assert_eq!(decoded, accounts);
    let task = &decoded.get("alice").unwrap().task_list("Work & <Play>").unwrap().tasks()[0];
    assert_eq!(task.title(), "  Ship \"it\" 'now'  ");
    assert_eq!(task.due_at(), Some(at(2024, 5, 1, 9, 30)));
}

#[test]
fn round_trip_in_local_time_keeps_wall_clock_due_dates() {
    let accounts = sample_accounts();
    let codec = MarkupCodec::new();

    let decoded = codec.decode(&codec.encode(&accounts).unwrap()).unwrap();
    assert_eq!(decoded, accounts);
}

#[test]
fn task_without_due_date_has_no_duedate_element() {
    let ids = SequentialIds::new("t");
    let mut alice = Account::restore("u-1", "alice", "H", "");
    let mut list = TaskList::restore("l-1", DEFAULT_LIST_NAME, false);
    list.add_task(Task::new(&ids, "Someday", ""));
    alice.add_task_list(list);
    let mut accounts = Accounts::new();
    accounts.insert(alice);

    let encoded = utc_codec().encode(&accounts).unwrap();
    let text = String::from_utf8(encoded.clone()).unwrap();
    assert!(!text.contains("duedate"));

    let decoded = utc_codec().decode(&encoded).unwrap();
    let task = &decoded.get("alice").unwrap().default_list().unwrap().tasks()[0];
    assert!(task.due_at().is_none());
}

#[test]
fn missing_attributes_and_optional_elements_use_defaults() {
    let accounts = decode_text(
        "<todolistapp>\
           <user>\
             <username>alice</username><password>H</password><uuid>u-1</uuid>\
             <TodoList><name>Work</name><uuid>l-1</uuid>\
               <item><uuid>t-1</uuid></item>\
             </TodoList>\
           </user>\
         </todolistapp>",
    )
    .unwrap();

    let alice = accounts.get("alice").unwrap();
    assert_eq!(alice.email(), "");
    let list = alice.task_list("Work").unwrap();
    assert!(list.is_mutable());
    let task = &list.tasks()[0];
    assert_eq!(task.title(), DEFAULT_TASK_TITLE);
    assert_eq!(task.comment(), "");
    assert!(!task.is_done());
    assert!(!task.is_starred());
    assert!(task.due_at().is_none());
}

#[test]
fn legacy_prio_attribute_is_read_as_starred() {
    let accounts = decode_text(
        r#"<todolistapp><user>
             <username>alice</username><password>H</password><uuid>u-1</uuid><email/>
             <TodoList changeable="false"><name>Default</name><uuid>l-1</uuid>
               <item prio="true" done="true"><title>Old</title><uuid>t-1</uuid><comment/>
                 <duedate>20240501T09:30:00+0200</duedate></item>
             </TodoList>
           </user></todolistapp>"#,
    )
    .unwrap();

    let task = &accounts.get("alice").unwrap().default_list().unwrap().tasks()[0];
    assert!(task.is_starred());
    assert!(task.is_done());
    assert_eq!(task.due_at(), Some(at(2024, 5, 1, 7, 30)));
}

#[test]
fn wrong_root_element_is_rejected() {
    let reason = decode_reason("<accounts><user/></accounts>");
    assert!(reason.contains("expected `todolistapp`"), "{reason}");
}

#[test]
fn unparsable_documents_are_rejected() {
    for text in ["", "not xml", "<todolistapp><user></todolistapp>", "<todolistapp>"] {
        let err = decode_text(text).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidRecord { .. }), "{text}");
    }
    let err = utc_codec().decode(b"<todolistapp>\xff</todolistapp>").unwrap_err();
    assert!(err.reason().contains("UTF-8"));
}

#[test]
fn unknown_elements_are_rejected() {
    let reason = decode_reason("<todolistapp><group/></todolistapp>");
    assert!(reason.contains("unexpected element `group`"), "{reason}");

    let reason = decode_reason(
        "<todolistapp><user><username>a</username><password>H</password>\
         <uuid>u</uuid><avatar/></user></todolistapp>",
    );
    assert!(reason.contains("unexpected element `avatar` in `user`"), "{reason}");
}

#[test]
fn required_elements_must_be_present() {
    let reason = decode_reason(
        "<todolistapp><user><username>alice</username><password>H</password></user></todolistapp>",
    );
    assert!(reason.contains("missing `uuid` element in `user`"), "{reason}");

    let reason = decode_reason(
        "<todolistapp><user><username>alice</username><password>H</password><uuid>u</uuid>\
         <TodoList><uuid>l</uuid></TodoList></user></todolistapp>",
    );
    assert!(reason.contains("missing `name` element in `TodoList`"), "{reason}");
}

#[test]
fn duplicates_are_rejected() {
    let user = "<user><username>alice</username><password>H</password><uuid>u</uuid></user>";
    let reason = decode_reason(&format!("<todolistapp>{user}{user}</todolistapp>"));
    assert!(reason.contains("duplicate account `alice`"), "{reason}");

    let list = "<TodoList><name>Work</name><uuid>l</uuid></TodoList>";
    let reason = decode_reason(&format!(
        "<todolistapp><user><username>alice</username><password>H</password>\
         <uuid>u</uuid>{list}{list}</user></todolistapp>"
    ));
    assert!(reason.contains("duplicate task list `Work`"), "{reason}");
}

#[test]
fn repeated_task_id_in_one_list_is_rejected() {
    let item = "<item><title>A</title><uuid>t</uuid></item>";
    let reason = decode_reason(&format!(
        "<todolistapp><user><username>alice</username><password>H</password>\
         <uuid>u</uuid><TodoList><name>Work</name><uuid>l</uuid>{item}{item}</TodoList>\
         </user></todolistapp>"
    ));
    assert!(reason.contains("duplicate task `t` in list `Work`"), "{reason}");
}

#[test]
fn same_task_id_in_different_lists_is_accepted() {
    let item = "<item><title>A</title><uuid>t</uuid></item>";
    let accounts = decode_text(&format!(
        "<todolistapp><user><username>alice</username><password>H</password><uuid>u</uuid>\
         <TodoList><name>Work</name><uuid>l-1</uuid>{item}</TodoList>\
         <TodoList><name>Home</name><uuid>l-2</uuid>{item}</TodoList>\
         </user></todolistapp>"
    ))
    .unwrap();
    assert_eq!(accounts.get("alice").unwrap().task_lists().len(), 2);
}

#[test]
fn malformed_due_date_is_rejected() {
    let reason = decode_reason(
        "<todolistapp><user><username>alice</username><password>H</password><uuid>u</uuid>\
         <TodoList><name>Work</name><uuid>l</uuid>\
         <item><uuid>t</uuid><duedate>soon</duedate></item>\
         </TodoList></user></todolistapp>",
    );
    assert!(reason.contains("invalid due date `soon`"), "{reason}");
}

#[test]
fn empty_root_decodes_to_empty_collection() {
    assert!(decode_text("<?xml version=\"1.0\"?><todolistapp/>")
        .unwrap()
        .is_empty());
}
