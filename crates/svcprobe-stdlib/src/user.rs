//! `user` service: an in-memory user directory

use std::any::Any;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use svcprobe_sdk::{
    arg_int, arg_str, opt_arg, ClassBuilder, ClassInfo, DefaultValue, Modifiers, Param, Service,
    ServiceError, ServiceResult, Value,
};
use tracing::debug;

/// Stored user record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Numeric id
    pub id: i64,
    /// Login name
    pub username: String,
    /// Stored password
    password: String,
    /// Contact address
    pub email: Option<String>,
}

impl User {
    fn to_value(&self) -> Value {
        Value::map([
            ("id", Value::Int(self.id)),
            ("username", Value::from(self.username.as_str())),
            ("email", Value::from(self.email.clone())),
        ])
    }
}

static CLASS: Lazy<ClassInfo> = Lazy::new(|| {
    ClassBuilder::<UserService>::new()
        .constructor(&[])
        .method("getUser", &[Param::required("id")], |svc, args| {
            svc.get_user(arg_int(args, 0, "id")?)
        })
        .method("listUsers", &[Param::optional("limit", 10)], |svc, args| {
            let limit = match opt_arg(args, 0) {
                Some(v) => v.coerce_int().ok_or_else(|| {
                    ServiceError::argument(format!(
                        "Argument 'limit' must be an integer, got {:?}",
                        v
                    ))
                })?,
                None => 10,
            };
            Ok(svc.list_users(limit))
        })
        .method(
            "login",
            &[Param::required("username"), Param::required("password")],
            |svc, args| svc.login(&arg_str(args, 0, "username")?, &arg_str(args, 1, "password")?),
        )
        .method(
            "addUser",
            &[
                Param::required("username"),
                Param::required("password"),
                Param::optional("email", DefaultValue::Null),
            ],
            |svc, args| {
                let email = opt_arg(args, 2).and_then(Value::scalar_text);
                svc.add_user(&arg_str(args, 0, "username")?, &arg_str(args, 1, "password")?, email)
            },
        )
        .member("findByName", Modifiers::PRIVATE, &[Param::required("username")], |svc, args| {
            let name = arg_str(args, 0, "username")?;
            Ok(svc.find_by_name(&name).map(|u| u.to_value()).unwrap_or_default())
        })
        .build()
});

/// In-memory user directory
pub struct UserService {
    users: RwLock<Vec<User>>,
}

impl UserService {
    /// Directory seeded with an `admin` and a `guest` account
    pub fn new() -> Self {
        let seed = [
            ("admin", "secret", Some("admin@example.com")),
            ("guest", "guest", None),
        ];
        let users = seed
            .iter()
            .enumerate()
            .map(|(i, (name, password, email))| User {
                id: i as i64 + 1,
                username: name.to_string(),
                password: password.to_string(),
                email: email.map(str::to_string),
            })
            .collect();
        Self {
            users: RwLock::new(users),
        }
    }

    /// User by id; raises 404 when missing
    pub fn get_user(&self, id: i64) -> ServiceResult {
        self.users
            .read()
            .iter()
            .find(|u| u.id == id)
            .map(User::to_value)
            .ok_or_else(|| ServiceError::new(format!("No user with id {}", id)).with_code(404))
    }

    /// Up to `limit` users in id order; a negative limit lists none
    pub fn list_users(&self, limit: i64) -> Value {
        let limit = usize::try_from(limit).unwrap_or(0);
        Value::List(self.users.read().iter().take(limit).map(User::to_value).collect())
    }

    /// Check credentials; raises 401 on mismatch
    pub fn login(&self, username: &str, password: &str) -> ServiceResult {
        match self.find_by_name(username) {
            Some(user) if user.password == password => {
                debug!(username, "login accepted");
                Ok(user.to_value())
            }
            _ => {
                debug!(username, "login rejected");
                Err(ServiceError::new("Invalid username or password").with_code(401))
            }
        }
    }

    /// Add a user and return its id; raises 409 for a taken name
    pub fn add_user(&self, username: &str, password: &str, email: Option<String>) -> ServiceResult {
        if username.is_empty() {
            return Err(ServiceError::argument("Username cannot be empty").with_code(400));
        }
        let mut users = self.users.write();
        if users.iter().any(|u| u.username == username) {
            return Err(
                ServiceError::new(format!("User '{}' already exists", username)).with_code(409)
            );
        }
        let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        users.push(User {
            id,
            username: username.to_string(),
            password: password.to_string(),
            email,
        });
        Ok(Value::Int(id))
    }

    fn find_by_name(&self, username: &str) -> Option<User> {
        self.users.read().iter().find(|u| u.username == username).cloned()
    }
}

impl Default for UserService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service for UserService {
    fn class_info(&self) -> &ClassInfo {
        &CLASS
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
