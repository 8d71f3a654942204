use crate::domain::models::{
    Identity, LoginResponse, MessageResponse, ProfileEnvelope, RegisterRequest, RegisterResponse,
    UserProfile,
};
use crate::services::http::ApiClient;
use crate::services::session::{SessionError, SessionStore};
use serde_json::{json, Map, Value};

/// Signs in against `POST /login` and stores the returned identity.
///
/// The backend echoes the password hash in `user`; it is dropped before
/// anything is persisted.
pub fn login(
    api: &ApiClient,
    session: &SessionStore,
    phone_number_or_email: &str,
    password: &str,
) -> anyhow::Result<Identity> {
    let resp: LoginResponse = api.post(
        "/login",
        &json!({
            "phone_number_or_email": phone_number_or_email,
            "password": password,
        }),
    )?;
    let identity = identity_from_user(resp.user)?;
    session.login(identity.clone())?;
    tracing::debug!(message = %resp.message, "login accepted");
    Ok(identity)
}

pub fn identity_from_user(user: Value) -> Result<Identity, SessionError> {
    let mut user = match user {
        Value::Object(m) => m,
        other => {
            return Err(SessionError::InvalidIdentity(format!(
                "expected user object, got {}",
                other
            )))
        }
    };
    user.remove("password");
    serde_json::from_value(Value::Object(user))
        .map_err(|e| SessionError::InvalidIdentity(e.to_string()))
}

pub fn register(api: &ApiClient, req: &RegisterRequest) -> anyhow::Result<RegisterResponse> {
    if req.password.len() < 6 {
        anyhow::bail!(InputError("password must be at least 6 characters".into()));
    }
    if !req.email_address.contains('@') {
        anyhow::bail!(InputError(format!(
            "invalid email address: {}",
            req.email_address
        )));
    }
    let mut resp: RegisterResponse = api.post("/postRegister/", req)?;
    if let Value::Object(m) = &mut resp.user {
        m.remove("password");
    }
    Ok(resp)
}

pub fn fetch_profile(api: &ApiClient, session: &SessionStore) -> anyhow::Result<UserProfile> {
    let email = signed_in_email(session)?;
    let env: ProfileEnvelope = api.get("/getUserProfile", &[("email", email)])?;
    Ok(env.data)
}

/// Field-level changes accepted by `update_profile`; `None` keeps the
/// current value.
#[derive(Debug, Default, Clone)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub city: Option<String>,
    pub unit_number: Option<String>,
    pub street_number: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
}

impl ProfileChanges {
    pub fn apply(self, p: &mut UserProfile) {
        fn set<T>(slot: &mut Option<T>, v: Option<T>) {
            if v.is_some() {
                *slot = v;
            }
        }
        set(&mut p.name, self.name);
        set(&mut p.phone, self.phone);
        set(&mut p.age, self.age);
        set(&mut p.gender, self.gender);
        set(&mut p.city, self.city);
        set(&mut p.unit_number, self.unit_number);
        set(&mut p.street_number, self.street_number);
        set(&mut p.address_line1, self.address_line1);
        set(&mut p.address_line2, self.address_line2);
        set(&mut p.region, self.region);
        set(&mut p.postal_code, self.postal_code);
    }
}

/// Saves the profile through `POST /postUpdate`, then mirrors the personal
/// fields into the session identity.
pub fn update_profile(
    api: &ApiClient,
    session: &SessionStore,
    changes: ProfileChanges,
) -> anyhow::Result<UserProfile> {
    let mut profile = fetch_profile(api, session)?;
    changes.apply(&mut profile);
    let _: MessageResponse = api.post("/postUpdate", &profile)?;
    session.update_user(identity_patch(&profile))?;
    Ok(profile)
}

pub fn identity_patch(p: &UserProfile) -> Map<String, Value> {
    let mut patch = Map::new();
    patch.insert("email_address".into(), json!(p.email));
    if let Some(name) = &p.name {
        patch.insert("user_name".into(), json!(name));
    }
    for (key, val) in [
        ("phone_number", json!(p.phone)),
        ("age", json!(p.age)),
        ("gender", json!(p.gender)),
        ("city", json!(p.city)),
    ] {
        if !val.is_null() {
            patch.insert(key.into(), val);
        }
    }
    patch
}

pub fn signed_in_email(session: &SessionStore) -> Result<String, SessionError> {
    session
        .identity()
        .map(|i| i.email_address)
        .ok_or(SessionError::NotAuthenticated)
}

/// Rejected user input, reported as `INVALID_INPUT`.
#[derive(thiserror::Error, Debug)]
#[error("{0}")]
pub struct InputError(pub String);

#[cfg(test)]
mod tests {
    use super::{identity_from_user, identity_patch, ProfileChanges};
    use crate::domain::models::{Role, UserProfile};
    use serde_json::json;

    #[test]
    fn login_user_payload_drops_password() {
        let id = identity_from_user(json!({
            "user_name": "ana",
            "email_address": "ana@example.com",
            "phone_number": "0901",
            "password": "$2b$12$hash",
            "age": 30,
            "gender": "F",
            "city": "Hanoi",
            "role": 1
        }))
        .unwrap();
        assert_eq!(id.role, Role::Admin);
        assert!(!id.extra.contains_key("password"));
        let raw = serde_json::to_string(&id).unwrap();
        assert!(!raw.contains("password"));
    }

    #[test]
    fn login_user_payload_must_be_object() {
        assert!(identity_from_user(json!("ana")).is_err());
        assert!(identity_from_user(json!({"user_name": "ana"})).is_err());
    }

    #[test]
    fn changes_only_touch_given_fields() {
        let mut p = UserProfile {
            name: Some("ana".into()),
            email: "ana@example.com".into(),
            city: Some("Hanoi".into()),
            ..Default::default()
        };
        ProfileChanges {
            city: Some("Hue".into()),
            ..Default::default()
        }
        .apply(&mut p);
        assert_eq!(p.name.as_deref(), Some("ana"));
        assert_eq!(p.city.as_deref(), Some("Hue"));
    }

    #[test]
    fn identity_patch_maps_profile_names() {
        let p = UserProfile {
            name: Some("ana".into()),
            email: "ana@example.com".into(),
            phone: Some("0901".into()),
            age: Some(31),
            ..Default::default()
        };
        let patch = identity_patch(&p);
        assert_eq!(patch["user_name"], "ana");
        assert_eq!(patch["phone_number"], "0901");
        assert_eq!(patch["age"], 31);
        assert!(!patch.contains_key("city"));
    }
}
