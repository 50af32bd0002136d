#[cfg(test)]
use crate::features::auth::model::{Role, SessionUser};

#[cfg(test)]
use axum::{extract::Request, middleware::Next, Router};

#[cfg(test)]
use fake::{
    faker::internet::en::{SafeEmail, Username},
    Fake,
};

#[cfg(test)]
pub fn create_user_with_role(role: Role) -> SessionUser {
    let username: String = Username().fake();
    SessionUser {
        id: uuid::Uuid::new_v4().to_string(),
        username: username.replace(|c: char| !c.is_ascii_alphanumeric(), "_"),
        email: Some(SafeEmail().fake()),
        role,
    }
}

#[cfg(test)]
pub fn create_reporter_user() -> SessionUser {
    create_user_with_role(Role::User)
}

#[cfg(test)]
pub fn create_editor_user() -> SessionUser {
    create_user_with_role(Role::SpecialUser)
}

/// Stand in for the auth middleware: every request runs as `user`
#[cfg(test)]
pub fn with_session_user(router: Router, user: SessionUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
        },
    ))
}
