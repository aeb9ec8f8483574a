use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Form, Router,
};
use axum_extra::extract::CookieJar;
use itertools::Itertools;
use serde::Deserialize;
use tracing::warn;

use super::{reauthenticate, CookiePolicy};
use crate::admin::form::QuestionForm;
use crate::admin::notification::Notification;
use crate::admin::{AdminToken, Flow, Workspace, Workspaces};
use crate::api::{Category, QuestionApi};
use crate::server::app::AppState;

const QUESTIONS_PATH: &str = "/admin/questions";

/// Fields of the "add question" form. Every field is applied to the draft on
/// its own, so the draft survives a failed submission as typed.
#[derive(Deserialize)]
struct DraftFields {
    category: Category,
    #[serde(default)]
    question: String,
    #[serde(default)]
    option_0: String,
    #[serde(default)]
    option_1: String,
    #[serde(default)]
    option_2: String,
    #[serde(default)]
    option_3: String,
    #[serde(default)]
    correct_answer: String,
}

impl DraftFields {
    fn apply(self, form: &mut QuestionForm) {
        form.set_category(self.category);
        form.set_question(self.question);
        let options = [self.option_0, self.option_1, self.option_2, self.option_3];
        for (index, text) in options.into_iter().enumerate() {
            if let Err(e) = form.set_option(index, text) {
                warn!("Dropping form field: {e}");
            }
        }
        form.set_correct_answer(self.correct_answer);
    }
}

struct QuestionRow {
    id: String,
    category: Category,
    question: String,
    options: String,
    correct_answer: String,
}

struct Choice {
    value: String,
    selected: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "questions.html")]
struct QuestionsPage {
    active: &'static str,
    rows: Vec<QuestionRow>,
    categories: Vec<Choice>,
    question: String,
    options: Vec<String>,
    answers: Vec<Choice>,
    error: String,
    success: String,
    modal: bool,
}

impl From<&Workspace> for QuestionsPage {
    fn from(workspace: &Workspace) -> Self {
        let draft = workspace.form().draft();
        let (error, success) = match workspace.notices().current() {
            Notification::None => (String::new(), String::new()),
            Notification::Error(message) => (message.clone(), String::new()),
            Notification::Success(message) => (String::new(), message.clone()),
        };
        Self {
            active: "questions",
            rows: workspace
                .questions()
                .iter()
                .map(|q| QuestionRow {
                    id: q.id.clone().unwrap_or_default(),
                    category: q.category,
                    question: q.question.clone(),
                    options: q.options.iter().join(" / "),
                    correct_answer: q.correct_answer.clone(),
                })
                .collect(),
            categories: Category::ALL
                .into_iter()
                .map(|c| Choice {
                    value: c.to_string(),
                    selected: c == draft.category,
                })
                .collect(),
            question: draft.question.clone(),
            options: draft.options.to_vec(),
            answers: draft
                .answer_choices()
                .map(|a| Choice {
                    value: a.to_owned(),
                    selected: a == draft.correct_answer,
                })
                .collect(),
            error,
            success,
            modal: workspace.notices().modal_visible(),
        }
    }
}

fn after(
    flow: Flow,
    workspaces: &Workspaces,
    token: &AdminToken,
    jar: CookieJar,
    policy: CookiePolicy,
) -> Response {
    match flow {
        Flow::Continue => Redirect::to(QUESTIONS_PATH).into_response(),
        Flow::Reauthenticate => reauthenticate(workspaces, token, jar, policy, QUESTIONS_PATH),
    }
}

async fn questions_page(
    State(api): State<Arc<dyn QuestionApi>>,
    State(workspaces): State<Workspaces>,
    State(policy): State<CookiePolicy>,
    Extension(token): Extension<AdminToken>,
    jar: CookieJar,
) -> Response {
    let handle = workspaces.open(token.secret());
    let mut workspace = handle.lock().await;
    let flow = workspace
        .load(api.as_ref(), token.secret(), handle.cancel_token())
        .await;
    if flow == Flow::Continue {
        let page = QuestionsPage::from(&*workspace);
        workspace.notices_mut().clear();
        return page.into_response();
    }
    drop(workspace);
    after(flow, &workspaces, &token, jar, policy)
}

async fn submit_question(
    State(api): State<Arc<dyn QuestionApi>>,
    State(workspaces): State<Workspaces>,
    State(policy): State<CookiePolicy>,
    Extension(token): Extension<AdminToken>,
    jar: CookieJar,
    Form(fields): Form<DraftFields>,
) -> Response {
    let handle = workspaces.open(token.secret());
    let flow = {
        let mut workspace = handle.lock().await;
        match workspace
            .load(api.as_ref(), token.secret(), handle.cancel_token())
            .await
        {
            Flow::Continue => {
                fields.apply(workspace.form_mut());
                workspace
                    .submit(api.as_ref(), token.secret(), handle.cancel_token())
                    .await
            }
            flow => flow,
        }
    };
    after(flow, &workspaces, &token, jar, policy)
}

async fn edit_draft(
    State(api): State<Arc<dyn QuestionApi>>,
    State(workspaces): State<Workspaces>,
    State(policy): State<CookiePolicy>,
    Extension(token): Extension<AdminToken>,
    jar: CookieJar,
    Form(fields): Form<DraftFields>,
) -> Response {
    let handle = workspaces.open(token.secret());
    let flow = {
        let mut workspace = handle.lock().await;
        let flow = workspace
            .load(api.as_ref(), token.secret(), handle.cancel_token())
            .await;
        if flow == Flow::Continue {
            fields.apply(workspace.form_mut());
        }
        flow
    };
    after(flow, &workspaces, &token, jar, policy)
}

async fn delete_question(
    State(api): State<Arc<dyn QuestionApi>>,
    State(workspaces): State<Workspaces>,
    State(policy): State<CookiePolicy>,
    Extension(token): Extension<AdminToken>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Response {
    let handle = workspaces.open(token.secret());
    let flow = handle
        .lock()
        .await
        .delete(api.as_ref(), token.secret(), &id, handle.cancel_token())
        .await;
    after(flow, &workspaces, &token, jar, policy)
}

async fn dismiss_modal(
    State(workspaces): State<Workspaces>,
    Extension(token): Extension<AdminToken>,
) -> Redirect {
    if let Some(handle) = workspaces.find(token.secret()) {
        handle.lock().await.notices_mut().dismiss_modal();
    }
    Redirect::to(QUESTIONS_PATH)
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route(QUESTIONS_PATH, get(questions_page).post(submit_question))
        .route("/admin/questions/draft", post(edit_draft))
        .route("/admin/questions/dismiss-modal", post(dismiss_modal))
        .route("/admin/questions/{id}/delete", post(delete_question))
        .with_state(state)
}
