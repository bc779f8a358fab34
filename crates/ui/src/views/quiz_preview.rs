use dioxus::prelude::*;
use dioxus_router::Link;

use training_core::model::LessonId;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::toasts::{notify, use_notifications};
use crate::views::{ViewState, view_state_from_resource};
use crate::vm::{QuestionVm, QuizIntent, QuizPreviewVm, ScoreVm, ToastKind, load_quiz_for_lesson};

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

#[component]
pub fn QuizView(lesson_id: u64) -> Element {
    let ctx = use_context::<AppContext>();
    let notifications = use_notifications();
    let lesson_id = LessonId::new(lesson_id);
    let quizzes = ctx.quizzes();

    let resource = {
        let quizzes = quizzes.clone();
        use_resource(move || {
            let quizzes = quizzes.clone();
            async move { load_quiz_for_lesson(&quizzes, lesson_id).await }
        })
    };
    let state = view_state_from_resource(resource);

    // Working copy of the preview; seeded from the loaded quiz.
    let mut vm = use_signal(|| None::<QuizPreviewVm>);
    use_effect(move || {
        let loaded = resource
            .value()
            .read()
            .as_ref()
            .and_then(|result| result.as_ref().ok().cloned());
        if let Some(loaded) = loaded {
            if vm.peek().is_none() {
                vm.set(Some(loaded));
            }
        }
    });

    let dispatch_intent = use_callback(move |intent: QuizIntent| {
        let mut guard = vm.write();
        let Some(current) = guard.as_mut() else {
            return;
        };
        let submitting = intent == QuizIntent::Submit;
        match current.apply(intent, &quizzes) {
            Ok(()) if submitting => {
                if let Some(score) = current.score() {
                    let kind = if score.passed {
                        ToastKind::Success
                    } else {
                        ToastKind::Info
                    };
                    notify(notifications, kind, score.headline);
                }
            }
            Ok(()) => {}
            Err(err) => notify(notifications, ToastKind::Error, err.message()),
        }
    });

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<QuizTestHandles>() {
                handles.register(dispatch_intent, vm);
            }
        }
    }

    let current = vm();

    rsx! {
        div { class: "page",
            Link { to: Route::Lesson { lesson_id: lesson_id.value() }, "Back to lesson" }

            match (state, current) {
                (ViewState::Error(err), _) => rsx! {
                    p { "{err.message()}" }
                },
                (_, Some(current)) => rsx! {
                    h2 { "{current.title()}" }
                    p { class: "quiz-passing", "{current.passing_label()}" }
                    if let Some(score) = current.score() {
                        ScorePanel { score, on_restart: move |()| dispatch_intent.call(QuizIntent::Restart) }
                    } else if let Some(question) = current.question() {
                        QuestionPanel { question, on_intent: dispatch_intent }
                    } else {
                        p { "This quiz has no questions." }
                        button {
                            r#type: "button",
                            onclick: move |_| dispatch_intent.call(QuizIntent::Submit),
                            "Submit"
                        }
                    }
                },
                (ViewState::Idle, None) => rsx! {
                    p { "Idle" }
                },
                (_, None) => rsx! {
                    p { "Loading..." }
                },
            }
        }
    }
}

#[component]
fn QuestionPanel(question: QuestionVm, on_intent: EventHandler<QuizIntent>) -> Element {
    rsx! {
        div { class: "quiz-question",
            p { class: "quiz-counter", "{question.counter}" }
            h3 { "{question.text}" }
            p { class: "quiz-points", "{question.points} pt" }

            if question.free_text {
                textarea {
                    value: "{question.written}",
                    oninput: move |evt| on_intent.call(QuizIntent::Write(evt.value())),
                }
            } else {
                ul { class: "quiz-answers",
                    for answer in question.answers {
                        li {
                            key: "{answer.index}",
                            class: if answer.selected { "selected" },
                            button {
                                r#type: "button",
                                onclick: move |_| on_intent.call(QuizIntent::Select(answer.index)),
                                "{answer.text}"
                            }
                        }
                    }
                }
            }

            div { class: "quiz-nav",
                button {
                    r#type: "button",
                    disabled: question.is_first,
                    onclick: move |_| on_intent.call(QuizIntent::Previous),
                    "Previous"
                }
                if question.is_last {
                    button {
                        r#type: "button",
                        onclick: move |_| on_intent.call(QuizIntent::Submit),
                        "Submit"
                    }
                } else {
                    button {
                        r#type: "button",
                        onclick: move |_| on_intent.call(QuizIntent::Next),
                        "Next"
                    }
                }
            }
        }
    }
}

#[component]
fn ScorePanel(score: ScoreVm, on_restart: EventHandler<()>) -> Element {
    let class = if score.passed {
        "quiz-result passed"
    } else {
        "quiz-result failed"
    };
    rsx! {
        div { class,
            h3 { "{score.headline}" }
            p { "{score.detail}" }
            button {
                r#type: "button",
                onclick: move |_| on_restart.call(()),
                "Restart"
            }
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct QuizTestHandles {
    dispatch: Rc<RefCell<Option<Callback<QuizIntent>>>>,
    vm: Rc<RefCell<Option<Signal<Option<QuizPreviewVm>>>>>,
}

#[cfg(test)]
impl QuizTestHandles {
    pub(crate) fn register(
        &self,
        dispatch: Callback<QuizIntent>,
        vm: Signal<Option<QuizPreviewVm>>,
    ) {
        *self.dispatch.borrow_mut() = Some(dispatch);
        *self.vm.borrow_mut() = Some(vm);
    }

    pub(crate) fn dispatch(&self) -> Callback<QuizIntent> {
        (*self.dispatch.borrow()).expect("quiz dispatch registered")
    }

    pub(crate) fn vm(&self) -> Signal<Option<QuizPreviewVm>> {
        (*self.vm.borrow()).expect("quiz vm registered")
    }
}
