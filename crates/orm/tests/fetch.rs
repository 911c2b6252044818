mod common;

use common::*;
use strata_orm::{
    BatchConfig, BatchLoader, DatabaseRow, DatabaseValue, ModelError, OrmResult, Query,
    RelationData, RelationStatus, Selected,
};

/// Child rows whose trailing match column is one of the bound keys
fn matching(rows: Vec<DatabaseRow>, params: &[DatabaseValue]) -> Vec<DatabaseRow> {
    rows.into_iter()
        .filter(|row| {
            let key = row.values().last().and_then(DatabaseValue::as_key);
            params.iter().any(|param| param.as_key() == key)
        })
        .collect()
}

fn users_and_children(sql: &str, params: &[DatabaseValue]) -> OrmResult<Vec<DatabaseRow>> {
    if sql.starts_with("SELECT posts.") {
        let rows = vec![
            post_child_row(10, 1, "first"),
            post_child_row(11, 1, "second"),
            post_child_row(20, 2, "third"),
        ];
        Ok(matching(rows, params))
    } else if sql.starts_with("SELECT profiles.") {
        Ok(matching(vec![profile_child_row(100, 2, Some("/a.png"))], params))
    } else if sql.starts_with("SELECT tags.") {
        let rows = vec![
            tag_child_row(7, "rust", 1),
            tag_child_row(8, "sql", 1),
            tag_child_row(7, "rust", 3),
        ];
        Ok(matching(rows, params))
    } else if sql.contains("FROM users") {
        Ok(vec![
            user_row(1, "ada", Some("math")),
            user_row(2, "grace", None),
            user_row(3, "linus", None),
        ])
    } else {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_fetch_decodes_full_records() {
    init_tracing();
    let executor = FakeExecutor::new(|sql, params| users_and_children(sql, params));

    let users = Query::<User>::new().fetch(&executor).await.unwrap();

    assert_eq!(users.len(), 3);
    assert_eq!(
        users[0].record(),
        &User {
            id: 1,
            username: "ada".into(),
            bio: Some("math".into())
        }
    );
    assert_eq!(users[1].bio, None);
    assert!(matches!(users[0].relation("posts"), RelationStatus::NotRequested));
    assert_eq!(executor.calls().len(), 1);
}

#[tokio::test]
async fn test_partial_fetch_reports_selection_tri_state() {
    let executor = FakeExecutor::new(|_, _| {
        Ok(vec![row(vec![
            DatabaseValue::Int32(7),
            DatabaseValue::Null,
            DatabaseValue::Null,
        ])])
    });

    let users = Query::<User>::new()
        .select(UserField::Id)
        .select(UserField::Bio)
        .fetch(&executor)
        .await
        .unwrap();

    assert_eq!(executor.statements(), vec!["SELECT id, NULL, bio FROM users"]);
    let user = users[0].record();
    assert_eq!(user.id, Selected::Value(7));
    assert_eq!(user.username, Selected::NotFetched);
    assert_eq!(user.bio, Selected::Null);
}

#[tokio::test]
async fn test_has_many_loads_every_parent_with_one_query() {
    let executor = FakeExecutor::new(|sql, params| users_and_children(sql, params));

    let users = Query::<User>::new().with_posts().fetch(&executor).await.unwrap();

    let calls = executor.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[1].sql,
        "SELECT posts.id, posts.user_id, posts.title, posts.user_id FROM posts WHERE posts.user_id IN ($1, $2, $3) ORDER BY posts.user_id, posts.id"
    );
    assert_eq!(
        calls[1].params,
        vec![DatabaseValue::Int64(1), DatabaseValue::Int64(2), DatabaseValue::Int64(3)]
    );

    let titles = |i: usize| -> Vec<String> {
        users[i]
            .many::<Post>("posts")
            .into_result()
            .unwrap()
            .unwrap()
            .into_iter()
            .map(|post| post.title)
            .collect()
    };
    assert_eq!(titles(0), vec!["first", "second"]);
    assert_eq!(titles(1), vec!["third"]);
    assert!(titles(2).is_empty());
}

#[tokio::test]
async fn test_has_one_and_many_to_many() {
    let executor = FakeExecutor::new(|sql, params| users_and_children(sql, params));

    let users = Query::<User>::new()
        .with_profile()
        .with_tags()
        .fetch(&executor)
        .await
        .unwrap();

    let statements = executor.statements();
    assert_eq!(statements.len(), 3);
    assert!(statements.contains(
        &"SELECT tags.id, tags.name, user_tags.user_id FROM tags INNER JOIN user_tags ON user_tags.tag_id = tags.id WHERE user_tags.user_id IN ($1, $2, $3) ORDER BY user_tags.user_id, tags.id"
            .to_string()
    ));

    match users[1].one::<Profile>("profile") {
        RelationStatus::Loaded(Some(profile)) => assert_eq!(profile.avatar_url.as_deref(), Some("/a.png")),
        other => panic!("expected a profile, got {:?}", other),
    }
    assert!(matches!(users[0].one::<Profile>("profile"), RelationStatus::Loaded(None)));

    let tag_names = |i: usize| -> Vec<String> {
        match users[i].many::<Tag>("tags") {
            RelationStatus::Loaded(tags) => tags.into_iter().map(|tag| tag.name).collect(),
            other => panic!("expected tags, got {:?}", other),
        }
    };
    assert_eq!(tag_names(0), vec!["rust", "sql"]);
    assert!(tag_names(1).is_empty());
    assert_eq!(tag_names(2), vec!["rust"]);
}

#[tokio::test]
async fn test_belongs_to_loads_owner() {
    let executor = FakeExecutor::new(|sql, _| {
        if sql.starts_with("SELECT users.") {
            Ok(vec![row(vec![DatabaseValue::Int32(1), "ada".into(), DatabaseValue::Null, DatabaseValue::Int32(1)])])
        } else {
            Ok(vec![
                row(vec![DatabaseValue::Int32(10), DatabaseValue::Int32(1), "first".into()]),
                row(vec![DatabaseValue::Int32(11), DatabaseValue::Int32(1), "second".into()]),
            ])
        }
    });

    let posts = Query::<Post>::new().with("author").fetch(&executor).await.unwrap();

    assert_eq!(
        executor.statements()[1],
        "SELECT users.id, users.username, users.bio, users.id FROM users WHERE users.id IN ($1) ORDER BY users.id"
    );
    for post in &posts {
        match post.one::<User>("author") {
            RelationStatus::Loaded(Some(author)) => assert_eq!(author.username, "ada"),
            other => panic!("expected an author, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_one_failing_relationship_leaves_the_rest_usable() {
    let executor = FakeExecutor::new(|sql, params| {
        if sql.starts_with("SELECT profiles.") {
            Err(ModelError::query("driver", "permission denied for table profiles"))
        } else {
            users_and_children(sql, params)
        }
    });

    let users = Query::<User>::new()
        .with_posts()
        .with_profile()
        .fetch(&executor)
        .await
        .unwrap();

    assert_eq!(users.len(), 3);
    assert_eq!(users[0].username, "ada");
    for user in &users {
        assert!(user.relation("posts").is_loaded());
        let err = user.relation("profile").error().cloned().unwrap();
        assert!(matches!(
            err,
            ModelError::Query { ref label, .. } if label == "profiles.profile"
        ));
    }
    assert_eq!(users[0].relation("posts").loaded().map(RelationData::len), Some(2));
}

#[tokio::test]
async fn test_base_query_failure_aborts_with_label() {
    let executor = FakeExecutor::new(|sql, _| {
        if sql.contains("FROM users") {
            Err(ModelError::query("driver", "syntax error"))
        } else {
            Ok(Vec::new())
        }
    });

    let err = Query::<User>::new().with_posts().fetch(&executor).await.unwrap_err();

    match err {
        ModelError::Query { label, message } => {
            assert_eq!(label, "users.select");
            assert_eq!(message, "syntax error");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(executor.calls().len(), 1);
}

#[tokio::test]
async fn test_connection_failure_passes_through() {
    let executor = FakeExecutor::new(|_, _| Err(ModelError::Connection("pool timed out".into())));

    let err = Query::<User>::new().fetch(&executor).await.unwrap_err();

    assert!(err.is_connection());
}

#[tokio::test]
async fn test_unknown_relationship_fails_before_any_sql() {
    let executor = FakeExecutor::empty();

    let err = Query::<User>::new().with("comments").fetch(&executor).await.unwrap_err();

    assert!(matches!(
        err,
        ModelError::UnknownRelationship { ref entity, ref name } if entity == "users" && name == "comments"
    ));
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_no_base_rows_means_no_relationship_queries() {
    let executor = FakeExecutor::empty();

    let users = Query::<User>::new()
        .with_posts()
        .with_tags()
        .fetch(&executor)
        .await
        .unwrap();

    assert!(users.is_empty());
    assert_eq!(executor.calls().len(), 1);
}

#[tokio::test]
async fn test_partial_query_without_join_key_marks_relationship_failed() {
    let executor = FakeExecutor::new(|sql, _| {
        if sql.starts_with("SELECT NULL") {
            Ok(vec![row(vec![DatabaseValue::Null, "ada".into(), DatabaseValue::Null])])
        } else {
            Ok(Vec::new())
        }
    });

    let users = Query::<User>::new()
        .select(UserField::Username)
        .with_posts()
        .fetch(&executor)
        .await
        .unwrap();

    assert_eq!(users[0].username, Selected::Value("ada".to_string()));
    assert!(matches!(
        users[0].relation("posts"),
        RelationStatus::Failed(ModelError::Relationship { .. })
    ));
    assert_eq!(executor.calls().len(), 1);
}

#[tokio::test]
async fn test_first_limits_to_one_row() {
    let executor = FakeExecutor::new(|_, _| Ok(vec![user_row(1, "ada", None)]));

    let user = Query::<User>::new()
        .where_username("ada")
        .limit(50)
        .first(&executor)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(user.id, 1);
    assert_eq!(
        executor.statements(),
        vec!["SELECT id, username, bio FROM users WHERE username = $1 LIMIT 1"]
    );
}

#[tokio::test]
async fn test_malformed_row_is_a_decode_error() {
    let executor = FakeExecutor::new(|_, _| Ok(vec![row(vec![DatabaseValue::Int32(1), "ada".into()])]));

    let err = Query::<User>::new().fetch(&executor).await.unwrap_err();

    assert!(matches!(err, ModelError::Decode(_)));
}

#[tokio::test]
async fn test_sequential_loader_gives_the_same_result() {
    let executor = FakeExecutor::new(|sql, params| users_and_children(sql, params));
    let loader = BatchLoader::with_config(BatchConfig {
        max_batch_size: 2,
        parallel_execution: false,
    });

    let users = Query::<User>::new()
        .with_posts()
        .fetch_with(&executor, &loader)
        .await
        .unwrap();

    // Three parent keys in chunks of two
    assert_eq!(executor.calls().len(), 3);
    assert_eq!(users[0].relation("posts").loaded().map(RelationData::len), Some(2));
    assert_eq!(users[1].relation("posts").loaded().map(RelationData::len), Some(1));
}
