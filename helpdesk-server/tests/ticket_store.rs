//! Ticket store against a real SQLite database
//! Run: cargo test -p helpdesk-server --test ticket_store

mod common;

use common::{HOUR_MS, T0, TestDb};
use shared::error::ErrorCode;
use shared::models::{Role, TicketPriority, TicketStatus};
use shared::sla;

use helpdesk_server::ServiceError;
use helpdesk_server::tickets::{NewComment, NewTicket, TicketChanges, TicketFilters};

fn new_ticket(creator_id: &str, priority: TicketPriority) -> NewTicket {
    NewTicket {
        title: "Printer on fire".into(),
        description: "The second floor printer is smoking again.".into(),
        priority,
        category: Some("hardware".into()),
        creator_id: creator_id.to_string(),
        assignee_id: None,
    }
}

fn comment(ticket_id: &str, author_id: &str, body: &str, parent: Option<&str>) -> NewComment {
    NewComment {
        ticket_id: ticket_id.to_string(),
        author_id: author_id.to_string(),
        body: body.to_string(),
        parent_comment_id: parent.map(str::to_string),
    }
}

fn app_code(err: ServiceError) -> ErrorCode {
    match err {
        ServiceError::App(e) => e.code,
        ServiceError::Db(e) => panic!("unexpected database error: {e}"),
    }
}

#[tokio::test]
async fn test_create_starts_at_version_zero_with_one_event() {
    let db = TestDb::new().await;
    let alice = db.user("alice@example.com", "Alice Requester", Role::Requester).await;

    let detail = db
        .store()
        .create(new_ticket(&alice, TicketPriority::High), T0)
        .await
        .unwrap();

    assert_eq!(detail.summary.version, 0);
    assert_eq!(detail.summary.status, TicketStatus::Open);
    assert_eq!(detail.summary.sla_due_at, T0 + 6 * HOUR_MS);
    assert!(!detail.summary.sla_breached);
    assert_eq!(detail.summary.creator_name, "Alice Requester");
    assert_eq!(detail.timeline.len(), 1);
    assert_eq!(detail.timeline[0].event_type, "TICKET_CREATED");
    assert_eq!(detail.timeline[0].description, "Alice Requester created the ticket");
    assert_eq!(detail.timeline[0].payload["priority"], "high");
    assert!(detail.participants.contains_key(&alice));
}

#[tokio::test]
async fn test_urgent_ticket_breaches_after_two_hours() {
    let db = TestDb::new().await;
    let alice = db.user("alice@example.com", "Alice", Role::Requester).await;

    let created = db
        .store()
        .create(new_ticket(&alice, TicketPriority::Urgent), T0)
        .await
        .unwrap();
    assert_eq!(created.summary.sla_due_at, T0 + 2 * HOUR_MS);
    assert!(!created.summary.sla_breached);

    let before = db.store().get(&created.summary.id, T0 + 2 * HOUR_MS - 1).await.unwrap();
    assert!(!before.summary.sla_breached);

    let after = db.store().get(&created.summary.id, T0 + 2 * HOUR_MS + 1).await.unwrap();
    assert!(after.summary.sla_breached);
}

#[tokio::test]
async fn test_stale_version_is_rejected() {
    let db = TestDb::new().await;
    let alice = db.user("alice@example.com", "Alice", Role::Requester).await;
    let agent = db.user("bob@example.com", "Bob Agent", Role::Agent).await;
    let id = db
        .store()
        .create(new_ticket(&alice, TicketPriority::Low), T0)
        .await
        .unwrap()
        .summary
        .id;

    let changes = TicketChanges {
        status: Some(TicketStatus::InProgress),
        ..Default::default()
    };
    let updated = db
        .store()
        .update(&id, changes.clone(), 0, &agent, T0 + 1)
        .await
        .unwrap();
    assert_eq!(updated.summary.version, 1);
    assert_eq!(updated.summary.status, TicketStatus::InProgress);
    let last = updated.timeline.last().unwrap();
    assert_eq!(last.event_type, "STATUS_CHANGED");
    assert_eq!(last.description, "Bob Agent changed status from open to in progress");

    let err = db
        .store()
        .update(&id, changes, 0, &agent, T0 + 2)
        .await
        .unwrap_err();
    assert_eq!(app_code(err), ErrorCode::VersionMismatch);

    let current = db.store().get(&id, T0 + 3).await.unwrap();
    assert_eq!(current.summary.version, 1);
    assert_eq!(current.timeline.len(), 2);
}

#[tokio::test]
async fn test_update_missing_ticket() {
    let db = TestDb::new().await;
    let agent = db.user("bob@example.com", "Bob", Role::Agent).await;

    let err = db
        .store()
        .update("missing", TicketChanges::default(), 0, &agent, T0)
        .await
        .unwrap_err();
    assert_eq!(app_code(err), ErrorCode::TicketNotFound);
}

#[tokio::test]
async fn test_concurrent_updates_have_one_winner() {
    let db = TestDb::new().await;
    let alice = db.user("alice@example.com", "Alice", Role::Requester).await;
    let agent = db.user("bob@example.com", "Bob", Role::Agent).await;
    let id = db
        .store()
        .create(new_ticket(&alice, TicketPriority::Medium), T0)
        .await
        .unwrap()
        .summary
        .id;

    let store = db.store();
    let first = store.update(
        &id,
        TicketChanges {
            title: Some("First writer".into()),
            ..Default::default()
        },
        0,
        &agent,
        T0 + 1,
    );
    let second = store.update(
        &id,
        TicketChanges {
            title: Some("Second writer".into()),
            ..Default::default()
        },
        0,
        &agent,
        T0 + 1,
    );
    let (first, second) = futures::join!(first, second);

    let outcomes = [first, second];
    let winners = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    for outcome in outcomes {
        if let Err(err) = outcome {
            assert_eq!(app_code(err), ErrorCode::VersionMismatch);
        }
    }

    let current = db.store().get(&id, T0 + 2).await.unwrap();
    assert_eq!(current.summary.version, 1);
    assert_eq!(current.timeline.len(), 2);
}

#[tokio::test]
async fn test_comments_and_updates_interleave_on_one_ticket() {
    let db = TestDb::new().await;
    let alice = db.user("alice@example.com", "Alice", Role::Requester).await;
    let agent = db.user("bob@example.com", "Bob", Role::Agent).await;
    let id = db
        .store()
        .create(new_ticket(&alice, TicketPriority::Medium), T0)
        .await
        .unwrap()
        .summary
        .id;

    let store = db.store();
    for i in 0..5_i64 {
        let now = T0 + 10 * (i + 1);
        let body = format!("c{i}");
        let (commented, updated) = futures::join!(
            store.add_comment(comment(&id, &alice, &body, None), now),
            store.update(
                &id,
                TicketChanges {
                    title: Some(format!("Printer check {i}")),
                    ..Default::default()
                },
                i,
                &agent,
                now,
            )
        );
        commented.unwrap();
        assert_eq!(updated.unwrap().summary.version, i + 1);
    }

    // Comments never bump the version
    let current = db.store().get(&id, T0 + 100).await.unwrap();
    assert_eq!(current.summary.version, 5);
    assert_eq!(current.summary.title, "Printer check 4");
    assert_eq!(current.comments.len(), 5);
    assert_eq!(current.summary.latest_comment_excerpt.as_deref(), Some("c4"));
    assert_eq!(current.timeline.len(), 11);
}

#[tokio::test]
async fn test_noop_update_writes_nothing() {
    let db = TestDb::new().await;
    let alice = db.user("alice@example.com", "Alice", Role::Requester).await;
    let created = db
        .store()
        .create(new_ticket(&alice, TicketPriority::Medium), T0)
        .await
        .unwrap();

    let same = TicketChanges {
        title: Some(created.summary.title.clone()),
        priority: Some(TicketPriority::Medium),
        category: Some(Some("hardware".into())),
        ..Default::default()
    };
    let after = db
        .store()
        .update(&created.summary.id, same, 0, &alice, T0 + 10)
        .await
        .unwrap();

    assert_eq!(after.summary.version, 0);
    assert_eq!(after.summary.updated_at, T0);
    assert_eq!(after.timeline.len(), 1);
}

#[tokio::test]
async fn test_priority_change_recomputes_sla_and_clears_breach() {
    let db = TestDb::new().await;
    let alice = db.user("alice@example.com", "Alice", Role::Requester).await;
    let agent = db.user("bob@example.com", "Bob", Role::Agent).await;
    let id = db
        .store()
        .create(new_ticket(&alice, TicketPriority::Urgent), T0)
        .await
        .unwrap()
        .summary
        .id;

    let later = T0 + 3 * HOUR_MS;
    assert_eq!(db.store().sweep_breaches(later).await.unwrap(), 1);

    let updated = db
        .store()
        .update(
            &id,
            TicketChanges {
                priority: Some(TicketPriority::Low),
                ..Default::default()
            },
            0,
            &agent,
            later,
        )
        .await
        .unwrap();

    assert_eq!(updated.summary.priority, TicketPriority::Low);
    assert_eq!(updated.summary.sla_due_at, later + 24 * HOUR_MS);
    assert!(!updated.summary.sla_breached);
    assert_eq!(updated.summary.version, 1);
}

#[tokio::test]
async fn test_sweep_never_clears_and_skips_resolved() {
    let db = TestDb::new().await;
    let alice = db.user("alice@example.com", "Alice", Role::Requester).await;
    let agent = db.user("bob@example.com", "Bob", Role::Agent).await;
    let open = db
        .store()
        .create(new_ticket(&alice, TicketPriority::Urgent), T0)
        .await
        .unwrap()
        .summary
        .id;
    let resolved = db
        .store()
        .create(new_ticket(&alice, TicketPriority::Urgent), T0)
        .await
        .unwrap()
        .summary
        .id;
    db.store()
        .update(
            &resolved,
            TicketChanges {
                status: Some(TicketStatus::Resolved),
                ..Default::default()
            },
            0,
            &agent,
            T0 + 1,
        )
        .await
        .unwrap();

    let late = T0 + 5 * HOUR_MS;
    assert_eq!(db.store().sweep_breaches(late).await.unwrap(), 1);
    assert_eq!(db.store().sweep_breaches(late).await.unwrap(), 0);

    // Resolving afterwards keeps the flag
    let after = db
        .store()
        .update(
            &open,
            TicketChanges {
                status: Some(TicketStatus::Resolved),
                ..Default::default()
            },
            0,
            &agent,
            late,
        )
        .await
        .unwrap();
    assert!(after.summary.sla_breached);

    let untouched = db.store().get(&resolved, late).await.unwrap();
    assert!(!untouched.summary.sla_breached);
}

#[tokio::test]
async fn test_breach_starts_exactly_at_due_time() {
    let db = TestDb::new().await;
    let alice = db.user("alice@example.com", "Alice", Role::Requester).await;
    let id = db
        .store()
        .create(new_ticket(&alice, TicketPriority::Urgent), T0)
        .await
        .unwrap()
        .summary
        .id;
    let due = T0 + 2 * HOUR_MS;

    assert!(!sla::is_breached(due, TicketStatus::Open, due - 1));
    assert_eq!(db.store().sweep_breaches(due - 1).await.unwrap(), 0);
    let before = db.store().get(&id, due - 1).await.unwrap();
    assert!(!before.summary.sla_breached);

    assert!(sla::is_breached(due, TicketStatus::Open, due));
    assert_eq!(db.store().sweep_breaches(due).await.unwrap(), 1);
    let at_due = db.store().get(&id, due).await.unwrap();
    assert_eq!(at_due.summary.sla_due_at, due);
    assert!(at_due.summary.sla_breached);
}

#[tokio::test]
async fn test_comment_updates_excerpt_without_version_bump() {
    let db = TestDb::new().await;
    let alice = db.user("alice@example.com", "Alice", Role::Requester).await;
    let id = db
        .store()
        .create(new_ticket(&alice, TicketPriority::Medium), T0)
        .await
        .unwrap()
        .summary
        .id;

    let long_body = "é".repeat(300);
    let detail = db
        .store()
        .add_comment(comment(&id, &alice, &long_body, None), T0 + 5)
        .await
        .unwrap();

    assert_eq!(detail.summary.version, 0);
    assert_eq!(detail.summary.latest_comment_at, Some(T0 + 5));
    assert_eq!(detail.summary.updated_at, T0 + 5);
    let excerpt = detail.summary.latest_comment_excerpt.unwrap();
    assert_eq!(excerpt.chars().count(), 280);
    assert_eq!(detail.comments.len(), 1);
    assert_eq!(detail.comments[0].body.chars().count(), 300);
    assert_eq!(detail.timeline.last().unwrap().event_type, "COMMENT_ADDED");

    // The version a client already holds still works for an update
    let updated = db
        .store()
        .update(
            &id,
            TicketChanges {
                title: Some("Printer still on fire".into()),
                ..Default::default()
            },
            0,
            &alice,
            T0 + 6,
        )
        .await
        .unwrap();
    assert_eq!(updated.summary.version, 1);
}

#[tokio::test]
async fn test_comment_replies_form_a_tree() {
    let db = TestDb::new().await;
    let alice = db.user("alice@example.com", "Alice", Role::Requester).await;
    let agent = db.user("bob@example.com", "Bob Agent", Role::Agent).await;
    let id = db
        .store()
        .create(new_ticket(&alice, TicketPriority::Medium), T0)
        .await
        .unwrap()
        .summary
        .id;

    let first = db
        .store()
        .add_comment(comment(&id, &alice, "Any update?", None), T0 + 1)
        .await
        .unwrap();
    let c1 = first.comments[0].id.clone();

    let detail = db
        .store()
        .add_comment(comment(&id, &agent, "On my way.", Some(&c1)), T0 + 2)
        .await
        .unwrap();

    assert_eq!(detail.comments.len(), 1);
    assert_eq!(detail.comments[0].id, c1);
    assert_eq!(detail.comments[0].replies.len(), 1);
    let reply = &detail.comments[0].replies[0];
    assert_eq!(reply.parent_comment_id.as_deref(), Some(c1.as_str()));
    assert_eq!(reply.author_name, "Bob Agent");
    assert_eq!(reply.author_role, Role::Agent);
    assert!(reply.replies.is_empty());
}

#[tokio::test]
async fn test_orphan_comment_is_a_root() {
    let db = TestDb::new().await;
    let alice = db.user("alice@example.com", "Alice", Role::Requester).await;
    let id = db
        .store()
        .create(new_ticket(&alice, TicketPriority::Medium), T0)
        .await
        .unwrap()
        .summary
        .id;

    db.store()
        .add_comment(comment(&id, &alice, "First", None), T0 + 1)
        .await
        .unwrap();
    let detail = db
        .store()
        .add_comment(comment(&id, &alice, "Lost reply", Some("no-such-comment")), T0 + 2)
        .await
        .unwrap();

    assert_eq!(detail.comments.len(), 2);
    assert_eq!(detail.comments[1].body, "Lost reply");
}

#[tokio::test]
async fn test_comment_on_missing_ticket() {
    let db = TestDb::new().await;
    let alice = db.user("alice@example.com", "Alice", Role::Requester).await;

    let err = db
        .store()
        .add_comment(comment("missing", &alice, "hello", None), T0)
        .await
        .unwrap_err();
    assert_eq!(app_code(err), ErrorCode::TicketNotFound);
}

#[tokio::test]
async fn test_unknown_assignee_is_rejected() {
    let db = TestDb::new().await;
    let agent = db.user("bob@example.com", "Bob", Role::Agent).await;

    let mut new = new_ticket(&agent, TicketPriority::Medium);
    new.assignee_id = Some("ghost".into());
    let err = db.store().create(new, T0).await.unwrap_err();
    match err {
        ServiceError::App(e) => {
            assert_eq!(e.code, ErrorCode::ValidationError);
            assert_eq!(e.field.as_deref(), Some("assigneeId"));
        }
        ServiceError::Db(e) => panic!("unexpected database error: {e}"),
    }
}

#[tokio::test]
async fn test_list_scoping_search_and_paging() {
    let db = TestDb::new().await;
    let alice = db.user("alice@example.com", "Alice", Role::Requester).await;
    let carol = db.user("carol@example.com", "Carol", Role::Requester).await;
    let agent = db.user("bob@example.com", "Bob", Role::Agent).await;

    for i in 0..3 {
        db.store()
            .create(new_ticket(&alice, TicketPriority::Medium), T0 + i)
            .await
            .unwrap();
    }
    let carols = db
        .store()
        .create(new_ticket(&carol, TicketPriority::Medium), T0 + 10)
        .await
        .unwrap()
        .summary
        .id;
    db.store()
        .add_comment(comment(&carols, &carol, "The 50% toner_cartridge leaks", None), T0 + 11)
        .await
        .unwrap();

    // Requesters see only their own tickets, newest first
    let page = db
        .store()
        .list(&TicketFilters::for_user(alice.clone(), Role::Requester), T0 + 20)
        .await
        .unwrap();
    assert_eq!(page.items.len(), 3);
    assert!(page.items.iter().all(|t| t.creator_id == alice));
    assert!(page.items[0].created_at > page.items[2].created_at);
    assert_eq!(page.next_offset, None);

    // Staff see everything; paging reports the next offset
    let mut filters = TicketFilters::for_user(agent.clone(), Role::Agent);
    filters.limit = 3;
    let first = db.store().list(&filters, T0 + 20).await.unwrap();
    assert_eq!(first.items.len(), 3);
    assert_eq!(first.items[0].id, carols);
    assert_eq!(first.next_offset, Some(3));

    filters.offset = 3;
    let second = db.store().list(&filters, T0 + 20).await.unwrap();
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.next_offset, None);

    // Search covers the latest comment excerpt and treats wildcards literally
    let mut search = TicketFilters::for_user(agent.clone(), Role::Agent);
    search.q = Some("50% TONER_".into());
    let found = db.store().list(&search, T0 + 20).await.unwrap();
    assert_eq!(found.items.len(), 1);
    assert_eq!(found.items[0].id, carols);

    search.q = Some("%_".into());
    let none = db.store().list(&search, T0 + 20).await.unwrap();
    assert!(none.items.is_empty());
}

#[tokio::test]
async fn test_list_offset_near_max_is_an_empty_page() {
    let db = TestDb::new().await;
    let agent = db.user("bob@example.com", "Bob", Role::Agent).await;
    db.store()
        .create(new_ticket(&agent, TicketPriority::Low), T0)
        .await
        .unwrap();

    let mut filters = TicketFilters::for_user(agent, Role::Agent);
    filters.offset = i64::MAX - 5;
    let page = db.store().list(&filters, T0 + 1).await.unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.next_offset, None);
}

#[tokio::test]
async fn test_list_filters_status_and_breach() {
    let db = TestDb::new().await;
    let alice = db.user("alice@example.com", "Alice", Role::Requester).await;
    let agent = db.user("bob@example.com", "Bob", Role::Agent).await;

    let urgent = db
        .store()
        .create(new_ticket(&alice, TicketPriority::Urgent), T0)
        .await
        .unwrap()
        .summary
        .id;
    db.store()
        .create(new_ticket(&alice, TicketPriority::Low), T0)
        .await
        .unwrap();

    // Listing sweeps first, so the urgent ticket shows as breached
    let mut filters = TicketFilters::for_user(agent.clone(), Role::Agent);
    filters.breached = Some(true);
    let breached = db.store().list(&filters, T0 + 3 * HOUR_MS).await.unwrap();
    assert_eq!(breached.items.len(), 1);
    assert_eq!(breached.items[0].id, urgent);

    let mut filters = TicketFilters::for_user(agent, Role::Agent);
    filters.status = Some(TicketStatus::Closed);
    let closed = db.store().list(&filters, T0 + 3 * HOUR_MS).await.unwrap();
    assert!(closed.items.is_empty());
}
