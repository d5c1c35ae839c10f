//! SQLite-backed store.
//!
//! # Responsibility
//! - Implement the user/domain/task repositories over the migrated schema.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - One connection guarded by a mutex; every trait call holds it for its
//!   whole read-modify-write, so calls are atomic to callers.
//! - Rows that violate model invariants are rejected as `InvalidData` or
//!   `Validation`, never masked.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::model::domain::{Domain, NewDomain};
use crate::model::task::{NewTask, Priority, Task, TaskId, TaskStatus};
use crate::model::user::{normalize_email, NewUser, Role, User, UserId};
use crate::repo::{DomainRepository, RepoError, RepoResult, TaskRepository, UserRepository};
use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Params, Row};
use std::path::Path;

const USER_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    password_hash,
    role,
    preferred_domain
FROM users";

const DOMAIN_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    created_by
FROM domains";

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    domain,
    assigned_to,
    deadline,
    status,
    priority,
    created_by,
    created_at,
    completed_at
FROM tasks";

const NEWEST_FIRST: &str = "ORDER BY created_at DESC, id DESC";

/// Store adapter over a single migrated SQLite connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        open_db(path).map(Self::new)
    }

    /// Opens (and migrates) a private in-memory database.
    pub fn open_in_memory() -> DbResult<Self> {
        open_db_in_memory().map(Self::new)
    }

    fn query_users<P: Params>(&self, sql: &str, params: P) -> RepoResult<Vec<User>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }

    fn query_tasks<P: Params>(&self, sql: &str, params: P) -> RepoResult<Vec<Task>> {
        let conn = self.conn.lock();
        query_tasks_locked(&conn, sql, params)
    }
}

impl UserRepository for SqliteStore {
    fn create_user(&self, user: &NewUser) -> RepoResult<User> {
        let email = normalize_email(&user.email);
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO users (
                name,
                email,
                password_hash,
                role,
                preferred_domain
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                user.name.as_str(),
                email.as_str(),
                user.password_hash.as_str(),
                user.role.as_str(),
                user.preferred_domain.as_deref(),
            ],
        )
        .map_err(|err| unique_conflict(err, format!("email already registered: {email}")))?;

        Ok(User {
            id: conn.last_insert_rowid(),
            name: user.name.clone(),
            email,
            password_hash: user.password_hash.clone(),
            role: user.role,
            preferred_domain: user.preferred_domain.clone(),
        })
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let conn = self.conn.lock();
        get_user_locked(&conn, id)
    }

    fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut users = self.query_users(
            &format!("{USER_SELECT_SQL} WHERE email = ?1;"),
            [normalize_email(email)],
        )?;
        Ok(users.pop())
    }

    fn update_user_domain(&self, id: UserId, domain: &str) -> RepoResult<Option<User>> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE users SET preferred_domain = ?1 WHERE id = ?2;",
            params![domain, id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        get_user_locked(&conn, id)
    }

    fn users_by_domain(&self, domain: &str) -> RepoResult<Vec<User>> {
        self.query_users(
            &format!("{USER_SELECT_SQL} WHERE preferred_domain = ?1 ORDER BY id ASC;"),
            [domain],
        )
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        self.query_users(&format!("{USER_SELECT_SQL} ORDER BY id ASC;"), [])
    }
}

impl DomainRepository for SqliteStore {
    fn create_domain(&self, domain: &NewDomain) -> RepoResult<Domain> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO domains (name, description, created_by) VALUES (?1, ?2, ?3);",
            params![
                domain.name.as_str(),
                domain.description.as_deref(),
                domain.created_by,
            ],
        )
        .map_err(|err| unique_conflict(err, format!("domain already exists: {}", domain.name)))?;

        Ok(Domain {
            id: conn.last_insert_rowid(),
            name: domain.name.clone(),
            description: domain.description.clone(),
            created_by: domain.created_by,
        })
    }

    fn get_domain_by_name(&self, name: &str) -> RepoResult<Option<Domain>> {
        let conn = self.conn.lock();
        let domain = conn
            .query_row(
                &format!("{DOMAIN_SELECT_SQL} WHERE name = ?1;"),
                [name],
                parse_domain_row,
            )
            .optional()?;
        Ok(domain)
    }

    fn list_domains(&self) -> RepoResult<Vec<Domain>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!("{DOMAIN_SELECT_SQL} ORDER BY id ASC;"))?;
        let domains = stmt
            .query_map([], parse_domain_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(domains)
    }
}

impl TaskRepository for SqliteStore {
    fn create_task(&self, task: &NewTask) -> RepoResult<Task> {
        let draft = task.clone().into_task(0);
        draft.validate()?;

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO tasks (
                title,
                description,
                domain,
                assigned_to,
                deadline,
                status,
                priority,
                created_by,
                created_at,
                completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                draft.title.as_str(),
                draft.description.as_deref(),
                draft.domain.as_str(),
                draft.assigned_to,
                draft.deadline,
                draft.status.as_str(),
                draft.priority.as_str(),
                draft.created_by,
                draft.created_at,
                draft.completed_at,
            ],
        )?;

        Ok(Task {
            id: conn.last_insert_rowid(),
            ..draft
        })
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let conn = self.conn.lock();
        get_task_locked(&conn, id)
    }

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        self.query_tasks(&format!("{TASK_SELECT_SQL} {NEWEST_FIRST};"), [])
    }

    fn tasks_by_user(&self, user_id: UserId) -> RepoResult<Vec<Task>> {
        self.query_tasks(
            &format!("{TASK_SELECT_SQL} WHERE assigned_to = ?1 {NEWEST_FIRST};"),
            [user_id],
        )
    }

    fn tasks_by_domain(&self, domain: &str) -> RepoResult<Vec<Task>> {
        self.query_tasks(
            &format!("{TASK_SELECT_SQL} WHERE domain = ?1 {NEWEST_FIRST};"),
            [domain],
        )
    }

    fn overdue_tasks(&self, now_ms: i64) -> RepoResult<Vec<Task>> {
        self.query_tasks(
            &format!(
                "{TASK_SELECT_SQL}
                 WHERE status = 'pending'
                   AND deadline < ?1
                 ORDER BY deadline ASC, id ASC;"
            ),
            [now_ms],
        )
    }

    fn update_task_assignment(&self, id: TaskId, user_id: UserId) -> RepoResult<Option<Task>> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE tasks SET assigned_to = ?1 WHERE id = ?2;",
            params![user_id, id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        get_task_locked(&conn, id)
    }

    fn update_task_status(
        &self,
        id: TaskId,
        status: TaskStatus,
        now_ms: i64,
    ) -> RepoResult<Option<Task>> {
        let conn = self.conn.lock();
        let Some(mut task) = get_task_locked(&conn, id)? else {
            return Ok(None);
        };
        task.apply_status(status, now_ms);
        task.validate()?;

        conn.execute(
            "UPDATE tasks SET status = ?1, completed_at = ?2 WHERE id = ?3;",
            params![task.status.as_str(), task.completed_at, id],
        )?;
        Ok(Some(task))
    }
}

fn get_user_locked(conn: &Connection, id: UserId) -> RepoResult<Option<User>> {
    let mut stmt = conn.prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_user_row(row)?)),
        None => Ok(None),
    }
}

fn get_task_locked(conn: &Connection, id: TaskId) -> RepoResult<Option<Task>> {
    let mut tasks = query_tasks_locked(conn, &format!("{TASK_SELECT_SQL} WHERE id = ?1;"), [id])?;
    Ok(tasks.pop())
}

fn query_tasks_locked<P: Params>(conn: &Connection, sql: &str, params: P) -> RepoResult<Vec<Task>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut tasks = Vec::new();
    while let Some(row) = rows.next()? {
        tasks.push(parse_task_row(row)?);
    }
    Ok(tasks)
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let role_text: String = row.get("role")?;
    let role = Role::parse(&role_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid role `{role_text}` in users.role"))
    })?;

    Ok(User {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        role,
        preferred_domain: row.get("preferred_domain")?,
    })
}

fn parse_domain_row(row: &Row<'_>) -> rusqlite::Result<Domain> {
    Ok(Domain {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        created_by: row.get("created_by")?,
    })
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let status_text: String = row.get("status")?;
    let status = TaskStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid task status `{status_text}` in tasks.status"))
    })?;

    let priority_text: String = row.get("priority")?;
    let priority = Priority::parse(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid task priority `{priority_text}` in tasks.priority"
        ))
    })?;

    let task = Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        domain: row.get("domain")?,
        assigned_to: row.get("assigned_to")?,
        deadline: row.get("deadline")?,
        status,
        priority,
        created_by: row.get("created_by")?,
        created_at: row.get("created_at")?,
        completed_at: row.get("completed_at")?,
    };
    task.validate()?;
    Ok(task)
}

fn unique_conflict(err: rusqlite::Error, message: String) -> RepoError {
    match err.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation) => RepoError::Conflict(message),
        _ => RepoError::from(err),
    }
}
