mod common;

use common::{count_rows, engine_with_db, fields, inject_failure, page, user};
use engine::{Access, EngineError, RecordKind, Role};

#[tokio::test]
async fn trip_account_lifecycle() {
    let (engine, db) = engine_with_db().await;
    let owner = user(&engine, "ann").await;
    let manager = user(&engine, "bob").await;

    let account = engine.create_account("Trip", owner).await.unwrap();
    assert_eq!(account.name, "Trip");
    assert_eq!(
        engine.authorize(owner, account.id, Role::Owner).await.unwrap(),
        Access::Allowed
    );

    engine
        .grant_manager(account.id, manager, owner)
        .await
        .unwrap();

    let record = engine
        .create_record(
            account.id,
            fields("Taxi", RecordKind::Commuting, "12.50"),
            manager,
        )
        .await
        .unwrap();
    assert_eq!(record.amount.to_string(), "12.50");
    assert_eq!(record.create_user_id, manager);
    assert_eq!(record.last_modified_user_id, manager);

    let err = engine
        .rename_account(account.id, "Holiday", manager)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    engine.delete_account(account.id, owner).await.unwrap();

    let err = engine.account(account.id, owner).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("account not exists".to_string())
    );
    let records = engine.records(account.id, page(1), owner).await.unwrap();
    assert!(records.is_empty());

    assert_eq!(count_rows(&db, "records").await, 0);
    assert_eq!(count_rows(&db, "access_rules").await, 0);
    assert_eq!(count_rows(&db, "accounts").await, 0);
}

#[tokio::test]
async fn authorize_follows_role_ordering() {
    let (engine, _db) = engine_with_db().await;
    let owner = user(&engine, "ann").await;
    let manager = user(&engine, "bob").await;
    let stranger = user(&engine, "eve").await;
    let account = engine.create_account("Home", owner).await.unwrap();
    engine
        .grant_manager(account.id, manager, owner)
        .await
        .unwrap();

    let cases = [
        (owner, Role::Owner, Access::Allowed),
        (owner, Role::Manager, Access::Allowed),
        (manager, Role::Owner, Access::Denied),
        (manager, Role::Manager, Access::Allowed),
        (stranger, Role::Owner, Access::Denied),
        (stranger, Role::Manager, Access::Denied),
    ];
    for (user_id, required, expected) in cases {
        assert_eq!(
            engine.authorize(user_id, account.id, required).await.unwrap(),
            expected,
            "user {user_id} requiring {required}"
        );
    }

    // No account at all: still a denial, not an error.
    assert_eq!(
        engine.authorize(owner, 999, Role::Manager).await.unwrap(),
        Access::Denied
    );
}

#[tokio::test]
async fn missing_account_is_not_found_before_forbidden() {
    let (engine, _db) = engine_with_db().await;
    let owner = user(&engine, "ann").await;
    let stranger = user(&engine, "eve").await;
    let account = engine.create_account("Home", owner).await.unwrap();

    let err = engine.account(999, stranger).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine.account(account.id, stranger).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = engine.delete_account(account.id, stranger).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
    assert!(engine.account(account.id, owner).await.is_ok());
}

#[tokio::test]
async fn each_account_has_exactly_one_owner() {
    let (engine, _db) = engine_with_db().await;
    let owner = user(&engine, "ann").await;
    let manager = user(&engine, "bob").await;

    let first = engine.create_account("Home", owner).await.unwrap();
    let second = engine.create_account("Trip", owner).await.unwrap();
    engine.grant_manager(first.id, manager, owner).await.unwrap();

    for account in [&first, &second] {
        assert_eq!(
            engine
                .count_account_users(account.id, Role::Owner, owner)
                .await
                .unwrap(),
            1
        );
        let owners = engine
            .account_users(account.id, Role::Owner, page(1), owner)
            .await
            .unwrap();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].id, owner);
    }
    assert_eq!(
        engine
            .count_account_users(first.id, Role::Manager, manager)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn duplicate_grant_is_conflict() {
    let (engine, db) = engine_with_db().await;
    let owner = user(&engine, "ann").await;
    let manager = user(&engine, "bob").await;
    let account = engine.create_account("Home", owner).await.unwrap();

    engine
        .grant_manager(account.id, manager, owner)
        .await
        .unwrap();
    let err = engine
        .grant_manager(account.id, manager, owner)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    // The owner cannot be demoted through a grant either.
    let err = engine
        .grant_manager(account.id, owner, owner)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    assert_eq!(count_rows(&db, "access_rules").await, 2);
}

#[tokio::test]
async fn grant_requires_owner_and_existing_member() {
    let (engine, _db) = engine_with_db().await;
    let owner = user(&engine, "ann").await;
    let manager = user(&engine, "bob").await;
    let other = user(&engine, "eve").await;
    let account = engine.create_account("Home", owner).await.unwrap();
    engine
        .grant_manager(account.id, manager, owner)
        .await
        .unwrap();

    let err = engine
        .grant_manager(account.id, other, manager)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = engine
        .grant_manager(account.id, 999, owner)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("user not exists".to_string()));
}

#[tokio::test]
async fn revoke_owner_is_conflict_and_keeps_rule() {
    let (engine, _db) = engine_with_db().await;
    let owner = user(&engine, "ann").await;
    let account = engine.create_account("Home", owner).await.unwrap();

    let err = engine
        .revoke_manager(account.id, owner, owner)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
    assert_eq!(
        engine.authorize(owner, account.id, Role::Owner).await.unwrap(),
        Access::Allowed
    );
}

#[tokio::test]
async fn revoke_manager_removes_access() {
    let (engine, _db) = engine_with_db().await;
    let owner = user(&engine, "ann").await;
    let manager = user(&engine, "bob").await;
    let account = engine.create_account("Home", owner).await.unwrap();
    engine
        .grant_manager(account.id, manager, owner)
        .await
        .unwrap();

    engine
        .revoke_manager(account.id, manager, owner)
        .await
        .unwrap();
    assert_eq!(
        engine
            .authorize(manager, account.id, Role::Manager)
            .await
            .unwrap(),
        Access::Denied
    );

    let err = engine
        .revoke_manager(account.id, manager, owner)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("access rule not exists".to_string())
    );
}

#[tokio::test]
async fn rename_is_owner_only() {
    let (engine, _db) = engine_with_db().await;
    let owner = user(&engine, "ann").await;
    let account = engine.create_account("Home", owner).await.unwrap();

    let renamed = engine
        .rename_account(account.id, " Holiday ", owner)
        .await
        .unwrap();
    assert_eq!(renamed.name, "Holiday");

    let err = engine
        .rename_account(account.id, "A name far too long", owner)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn accounts_by_role_lists_and_counts() {
    let (engine, _db) = engine_with_db().await;
    let owner = user(&engine, "ann").await;
    let manager = user(&engine, "bob").await;

    let mut owned = Vec::new();
    for idx in 0..7 {
        let account = engine
            .create_account(&format!("Acc {idx}"), owner)
            .await
            .unwrap();
        owned.push(account.id);
    }
    engine.grant_manager(owned[2], manager, owner).await.unwrap();

    assert_eq!(
        engine
            .count_accounts_by_role(Role::Owner, owner)
            .await
            .unwrap(),
        7
    );
    assert_eq!(
        engine
            .count_accounts_by_role(Role::Manager, owner)
            .await
            .unwrap(),
        0
    );

    let small = engine::Page::new(2, 5).unwrap();
    let second_page = engine
        .accounts_by_role(Role::Owner, small, owner)
        .await
        .unwrap();
    let ids: Vec<i64> = second_page.iter().map(|a| a.id).collect();
    assert_eq!(ids, owned[5..].to_vec());

    let managed = engine
        .accounts_by_role(Role::Manager, page(1), manager)
        .await
        .unwrap();
    assert_eq!(managed.len(), 1);
    assert_eq!(managed[0].id, owned[2]);
}

#[tokio::test]
async fn member_access_checks_another_member() {
    let (engine, _db) = engine_with_db().await;
    let owner = user(&engine, "ann").await;
    let manager = user(&engine, "bob").await;
    let account = engine.create_account("Home", owner).await.unwrap();
    engine
        .grant_manager(account.id, manager, owner)
        .await
        .unwrap();

    let access = engine
        .member_access(account.id, owner, Role::Owner, manager)
        .await
        .unwrap();
    assert_eq!(access, Access::Allowed);
    let access = engine
        .member_access(account.id, manager, Role::Owner, owner)
        .await
        .unwrap();
    assert_eq!(access, Access::Denied);
}

#[tokio::test]
async fn failed_owner_grant_leaves_no_account() {
    let (engine, db) = engine_with_db().await;
    let owner = user(&engine, "ann").await;
    inject_failure(&db, "INSERT", "access_rules").await;

    let err = engine.create_account("Home", owner).await.unwrap_err();
    assert!(err.is_storage());
    assert_eq!(count_rows(&db, "accounts").await, 0);
    assert_eq!(count_rows(&db, "access_rules").await, 0);
}

#[tokio::test]
async fn failed_account_delete_rolls_back_cascade() {
    let (engine, db) = engine_with_db().await;
    let owner = user(&engine, "ann").await;
    let manager = user(&engine, "bob").await;
    let account = engine.create_account("Home", owner).await.unwrap();
    engine
        .grant_manager(account.id, manager, owner)
        .await
        .unwrap();
    for name in ["Bread", "Milk"] {
        engine
            .create_record(account.id, fields(name, RecordKind::Food, "2.10"), owner)
            .await
            .unwrap();
    }

    inject_failure(&db, "DELETE", "accounts").await;
    let err = engine.delete_account(account.id, owner).await.unwrap_err();
    assert!(err.is_storage());

    assert_eq!(count_rows(&db, "accounts").await, 1);
    assert_eq!(count_rows(&db, "access_rules").await, 2);
    assert_eq!(count_rows(&db, "records").await, 2);
    assert_eq!(
        engine.count_records(account.id, manager).await.unwrap(),
        2
    );
}
