use crate::session;
use crate::session::Role;
use crate::session::User;
use crate::state::AppState;
use crate::templates;

use axum::extract::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Redirect;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct LoginForm {
    name: String,
    email: String,
}

pub(crate) async fn login_form(State(state): State<AppState>) -> templates::LoginTemplate {
    templates::LoginTemplate {
        user_name: user_name(&state),
        app_name: state.config.app_name,
        error: String::new(),
    }
}

pub(crate) async fn login_submit(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, (StatusCode, templates::LoginTemplate)> {
    let name = form.name.trim();
    let email = form.email.trim();
    if name.is_empty() || email.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            templates::LoginTemplate {
                app_name: state.config.app_name,
                user_name: String::new(),
                error: "Name and email are required.".to_string(),
            },
        ));
    }

    let user = User {
        name: name.to_string(),
        email: email.to_string(),
        role: Role::Citizen,
        department: None,
    };
    session::login(&state.store, &user).map_err(|err| {
        eprintln!("failed to store session: {err}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            templates::LoginTemplate {
                app_name: state.config.app_name.clone(),
                user_name: String::new(),
                error: "Failed to sign in.".to_string(),
            },
        )
    })?;

    Ok(Redirect::to("/report"))
}

#[derive(Debug, Deserialize)]
pub(crate) struct OfficialLoginForm {
    name: String,
    email: String,
    department: String,
}

pub(crate) async fn official_login_form(
    State(state): State<AppState>,
) -> templates::OfficialLoginTemplate {
    templates::OfficialLoginTemplate {
        user_name: user_name(&state),
        app_name: state.config.app_name,
        error: String::new(),
    }
}

pub(crate) async fn official_login_submit(
    State(state): State<AppState>,
    Form(form): Form<OfficialLoginForm>,
) -> Result<Redirect, (StatusCode, templates::OfficialLoginTemplate)> {
    let name = form.name.trim();
    let email = form.email.trim();
    let department = form.department.trim();
    if name.is_empty() || email.is_empty() || department.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            templates::OfficialLoginTemplate {
                app_name: state.config.app_name,
                user_name: String::new(),
                error: "Name, email and department are required.".to_string(),
            },
        ));
    }

    let user = User {
        name: name.to_string(),
        email: email.to_string(),
        role: Role::Official,
        department: Some(department.to_string()),
    };
    session::login(&state.store, &user).map_err(|err| {
        eprintln!("failed to store session: {err}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            templates::OfficialLoginTemplate {
                app_name: state.config.app_name.clone(),
                user_name: String::new(),
                error: "Failed to sign in.".to_string(),
            },
        )
    })?;

    Ok(Redirect::to("/official"))
}

/// Transient page: clears the session and lands on Home.
pub(crate) async fn logout(State(state): State<AppState>) -> Redirect {
    if let Err(err) = session::logout(&state.store) {
        eprintln!("failed to clear session: {err}");
    }
    Redirect::to("/")
}

pub(crate) fn user_name(state: &AppState) -> String {
    session::current_user(&state.store)
        .map(|user| user.name)
        .unwrap_or_default()
}
