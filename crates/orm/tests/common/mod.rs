//! Sample schema shared by the integration tests, written the way the schema
//! generator emits it: field enums, entity impls, partial records, typed
//! `where_*` / `with_*` helpers and a typestate insert builder.

#![allow(dead_code)]

use std::marker::PhantomData;
use std::sync::Mutex;

use async_trait::async_trait;
use strata_orm::validation::LengthValidator;
use strata_orm::{
    DatabaseRow, DatabaseValue, Entity, Field, InsertBuilder, ModelResult, OrmResult, PivotTable,
    Query, QueryExecutor, Record, RelationshipDescriptor, RowDecoder, Selected, Selection,
    SelectMode, Set, Unset,
};

// ---------------------------------------------------------------------------
// users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    Id,
    Username,
    Bio,
}

impl Field for UserField {
    fn all() -> &'static [Self] {
        &[UserField::Id, UserField::Username, UserField::Bio]
    }

    fn column(self) -> &'static str {
        match self {
            UserField::Id => "id",
            UserField::Username => "username",
            UserField::Bio => "bio",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserPartial {
    pub id: Selected<i32>,
    pub username: Selected<String>,
    pub bio: Selected<String>,
}

pub const USER_COLUMNS: &[&str] = &["id", "username", "bio"];

pub const USER_POSTS: RelationshipDescriptor =
    RelationshipDescriptor::has_many("posts", "posts", POST_COLUMNS, "user_id", "id");
pub const USER_PROFILE: RelationshipDescriptor =
    RelationshipDescriptor::has_one("profile", "profiles", PROFILE_COLUMNS, "user_id", "id");
pub const USER_TAGS: RelationshipDescriptor = RelationshipDescriptor::many_to_many(
    "tags",
    "tags",
    TAG_COLUMNS,
    PivotTable {
        table: "user_tags",
        source_key: "user_id",
        target_key: "tag_id",
    },
    "id",
    "id",
);

static USER_RELATIONSHIPS: [RelationshipDescriptor; 3] = [USER_POSTS, USER_PROFILE, USER_TAGS];

impl Record for User {
    fn column_value(&self, column: &str) -> Selected<DatabaseValue> {
        match column {
            "id" => Selected::Value(self.id.into()),
            "username" => Selected::Value(self.username.clone().into()),
            "bio" => self.bio.clone().map(DatabaseValue::from).into(),
            _ => Selected::NotFetched,
        }
    }
}

impl Record for UserPartial {
    fn column_value(&self, column: &str) -> Selected<DatabaseValue> {
        match column {
            "id" => self.id.as_ref().map(|id| DatabaseValue::from(*id)),
            "username" => self.username.as_ref().map(|u| DatabaseValue::from(u.as_str())),
            "bio" => self.bio.as_ref().map(|b| DatabaseValue::from(b.as_str())),
            _ => Selected::NotFetched,
        }
    }
}

impl Entity for User {
    type Field = UserField;
    type Partial = UserPartial;

    fn table_name() -> &'static str {
        "users"
    }

    fn relationships() -> &'static [RelationshipDescriptor] {
        &USER_RELATIONSHIPS
    }

    fn required_fields() -> &'static [UserField] {
        &[UserField::Username]
    }

    fn from_row(row: &DatabaseRow) -> ModelResult<Self> {
        let mut decoder = RowDecoder::<UserField>::full(row)?;
        let user = User {
            id: decoder.value(UserField::Id)?,
            username: decoder.value(UserField::Username)?,
            bio: decoder.nullable(UserField::Bio)?,
        };
        decoder.finish()?;
        Ok(user)
    }

    fn partial_from_row(row: &DatabaseRow, selection: &Selection<UserField>) -> ModelResult<UserPartial> {
        let mut decoder = RowDecoder::partial(row, selection)?;
        let user = UserPartial {
            id: decoder.selected(UserField::Id)?,
            username: decoder.selected(UserField::Username)?,
            bio: decoder.selected(UserField::Bio)?,
        };
        decoder.finish()?;
        Ok(user)
    }
}

/// Typed filters and relationship requests for `users`
pub trait UserQueryExt: Sized {
    fn where_id(self, id: i32) -> Self;
    fn where_username(self, username: impl Into<String>) -> Self;
    fn where_bio(self, bio: Option<String>) -> Self;
    fn with_posts(self) -> Self;
    fn with_profile(self) -> Self;
    fn with_tags(self) -> Self;
}

impl<S: SelectMode> UserQueryExt for Query<User, S> {
    fn where_id(self, id: i32) -> Self {
        self.where_eq(UserField::Id, id)
    }

    fn where_username(self, username: impl Into<String>) -> Self {
        self.where_eq(UserField::Username, username.into())
    }

    fn where_bio(self, bio: Option<String>) -> Self {
        self.where_eq(UserField::Bio, bio)
    }

    fn with_posts(self) -> Self {
        self.with(USER_POSTS.name)
    }

    fn with_profile(self) -> Self {
        self.with(USER_PROFILE.name)
    }

    fn with_tags(self) -> Self {
        self.with(USER_TAGS.name)
    }
}

/// Insert builder for `users`; `execute` exists only once `username` is set
pub struct NewUser<U = Unset> {
    inner: InsertBuilder<User>,
    _username: PhantomData<U>,
}

impl NewUser<Unset> {
    pub fn new() -> Self {
        Self {
            inner: InsertBuilder::new(),
            _username: PhantomData,
        }
    }
}

impl<U> NewUser<U> {
    pub fn username(self, username: impl Into<String>) -> NewUser<Set> {
        NewUser {
            inner: self.inner.set_validated(
                UserField::Username,
                username.into(),
                LengthValidator::new().range(3, 32),
            ),
            _username: PhantomData,
        }
    }

    pub fn bio(self, bio: Option<String>) -> Self {
        Self {
            inner: self
                .inner
                .set_validated(UserField::Bio, bio, LengthValidator::new().max(160)),
            _username: PhantomData,
        }
    }
}

impl NewUser<Set> {
    pub fn builder(&self) -> &InsertBuilder<User> {
        &self.inner
    }

    pub async fn execute<X>(self, executor: &X) -> ModelResult<User>
    where
        X: QueryExecutor + ?Sized,
    {
        self.inner.execute(executor).await
    }
}

// ---------------------------------------------------------------------------
// posts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostField {
    Id,
    UserId,
    Title,
}

impl Field for PostField {
    fn all() -> &'static [Self] {
        &[PostField::Id, PostField::UserId, PostField::Title]
    }

    fn column(self) -> &'static str {
        match self {
            PostField::Id => "id",
            PostField::UserId => "user_id",
            PostField::Title => "title",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostPartial {
    pub id: Selected<i32>,
    pub user_id: Selected<i32>,
    pub title: Selected<String>,
}

pub const POST_COLUMNS: &[&str] = &["id", "user_id", "title"];

pub const POST_AUTHOR: RelationshipDescriptor =
    RelationshipDescriptor::belongs_to("author", "users", USER_COLUMNS, "user_id", "id");

static POST_RELATIONSHIPS: [RelationshipDescriptor; 1] = [POST_AUTHOR];

impl Record for Post {
    fn column_value(&self, column: &str) -> Selected<DatabaseValue> {
        match column {
            "id" => Selected::Value(self.id.into()),
            "user_id" => Selected::Value(self.user_id.into()),
            "title" => Selected::Value(self.title.clone().into()),
            _ => Selected::NotFetched,
        }
    }
}

impl Record for PostPartial {
    fn column_value(&self, column: &str) -> Selected<DatabaseValue> {
        match column {
            "id" => self.id.as_ref().map(|id| DatabaseValue::from(*id)),
            "user_id" => self.user_id.as_ref().map(|id| DatabaseValue::from(*id)),
            "title" => self.title.as_ref().map(|t| DatabaseValue::from(t.as_str())),
            _ => Selected::NotFetched,
        }
    }
}

impl Entity for Post {
    type Field = PostField;
    type Partial = PostPartial;

    fn table_name() -> &'static str {
        "posts"
    }

    fn relationships() -> &'static [RelationshipDescriptor] {
        &POST_RELATIONSHIPS
    }

    fn required_fields() -> &'static [PostField] {
        &[PostField::UserId, PostField::Title]
    }

    fn from_row(row: &DatabaseRow) -> ModelResult<Self> {
        let mut decoder = RowDecoder::<PostField>::full(row)?;
        let post = Post {
            id: decoder.value(PostField::Id)?,
            user_id: decoder.value(PostField::UserId)?,
            title: decoder.value(PostField::Title)?,
        };
        decoder.finish()?;
        Ok(post)
    }

    fn partial_from_row(row: &DatabaseRow, selection: &Selection<PostField>) -> ModelResult<PostPartial> {
        let mut decoder = RowDecoder::partial(row, selection)?;
        let post = PostPartial {
            id: decoder.selected(PostField::Id)?,
            user_id: decoder.selected(PostField::UserId)?,
            title: decoder.selected(PostField::Title)?,
        };
        decoder.finish()?;
        Ok(post)
    }
}

// ---------------------------------------------------------------------------
// profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    Id,
    UserId,
    AvatarUrl,
}

impl Field for ProfileField {
    fn all() -> &'static [Self] {
        &[ProfileField::Id, ProfileField::UserId, ProfileField::AvatarUrl]
    }

    fn column(self) -> &'static str {
        match self {
            ProfileField::Id => "id",
            ProfileField::UserId => "user_id",
            ProfileField::AvatarUrl => "avatar_url",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub id: i32,
    pub user_id: i32,
    pub avatar_url: Option<String>,
}

pub const PROFILE_COLUMNS: &[&str] = &["id", "user_id", "avatar_url"];

impl Record for Profile {
    fn column_value(&self, column: &str) -> Selected<DatabaseValue> {
        match column {
            "id" => Selected::Value(self.id.into()),
            "user_id" => Selected::Value(self.user_id.into()),
            "avatar_url" => self.avatar_url.clone().map(DatabaseValue::from).into(),
            _ => Selected::NotFetched,
        }
    }
}

impl Entity for Profile {
    type Field = ProfileField;
    type Partial = Profile;

    fn table_name() -> &'static str {
        "profiles"
    }

    fn from_row(row: &DatabaseRow) -> ModelResult<Self> {
        let mut decoder = RowDecoder::<ProfileField>::full(row)?;
        let profile = Profile {
            id: decoder.value(ProfileField::Id)?,
            user_id: decoder.value(ProfileField::UserId)?,
            avatar_url: decoder.nullable(ProfileField::AvatarUrl)?,
        };
        decoder.finish()?;
        Ok(profile)
    }

    fn partial_from_row(row: &DatabaseRow, _selection: &Selection<ProfileField>) -> ModelResult<Profile> {
        Self::from_row(row)
    }
}

// ---------------------------------------------------------------------------
// tags
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagField {
    Id,
    Name,
}

impl Field for TagField {
    fn all() -> &'static [Self] {
        &[TagField::Id, TagField::Name]
    }

    fn column(self) -> &'static str {
        match self {
            TagField::Id => "id",
            TagField::Name => "name",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub id: i32,
    pub name: String,
}

pub const TAG_COLUMNS: &[&str] = &["id", "name"];

impl Record for Tag {
    fn column_value(&self, column: &str) -> Selected<DatabaseValue> {
        match column {
            "id" => Selected::Value(self.id.into()),
            "name" => Selected::Value(self.name.clone().into()),
            _ => Selected::NotFetched,
        }
    }
}

impl Entity for Tag {
    type Field = TagField;
    type Partial = Tag;

    fn table_name() -> &'static str {
        "tags"
    }

    fn from_row(row: &DatabaseRow) -> ModelResult<Self> {
        let mut decoder = RowDecoder::<TagField>::full(row)?;
        let tag = Tag {
            id: decoder.value(TagField::Id)?,
            name: decoder.value(TagField::Name)?,
        };
        decoder.finish()?;
        Ok(tag)
    }

    fn partial_from_row(row: &DatabaseRow, _selection: &Selection<TagField>) -> ModelResult<Tag> {
        Self::from_row(row)
    }
}

// ---------------------------------------------------------------------------
// fake executor
// ---------------------------------------------------------------------------

/// One statement received by [`FakeExecutor`]
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub sql: String,
    pub params: Vec<DatabaseValue>,
}

type Responder = Box<dyn Fn(&str, &[DatabaseValue]) -> OrmResult<Vec<DatabaseRow>> + Send + Sync>;

/// In-memory executor answering statements with a closure and recording them
pub struct FakeExecutor {
    respond: Responder,
    calls: Mutex<Vec<Call>>,
}

impl FakeExecutor {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&str, &[DatabaseValue]) -> OrmResult<Vec<DatabaseRow>> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Executor that answers every statement with no rows
    pub fn empty() -> Self {
        Self::new(|_, _| Ok(Vec::new()))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn statements(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.sql).collect()
    }
}

#[async_trait]
impl QueryExecutor for FakeExecutor {
    async fn fetch_all(&self, sql: &str, params: &[DatabaseValue]) -> OrmResult<Vec<DatabaseRow>> {
        self.calls.lock().unwrap().push(Call {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        (self.respond)(sql, params)
    }

    async fn execute(&self, sql: &str, params: &[DatabaseValue]) -> OrmResult<u64> {
        self.fetch_all(sql, params).await.map(|rows| rows.len() as u64)
    }
}

pub fn row(values: Vec<DatabaseValue>) -> DatabaseRow {
    DatabaseRow::new(values)
}

pub fn user_row(id: i32, username: &str, bio: Option<&str>) -> DatabaseRow {
    row(vec![id.into(), username.into(), bio.into()])
}

/// Row of the posts relationship query: post columns plus the match column
pub fn post_child_row(id: i32, user_id: i32, title: &str) -> DatabaseRow {
    row(vec![id.into(), user_id.into(), title.into(), user_id.into()])
}

pub fn profile_child_row(id: i32, user_id: i32, avatar_url: Option<&str>) -> DatabaseRow {
    row(vec![id.into(), user_id.into(), avatar_url.into(), user_id.into()])
}

pub fn tag_child_row(id: i32, name: &str, user_id: i32) -> DatabaseRow {
    row(vec![id.into(), name.into(), user_id.into()])
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("strata_orm=debug")
        .with_test_writer()
        .try_init();
}
