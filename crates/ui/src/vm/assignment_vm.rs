use chrono::{DateTime, NaiveDate, Utc};
use services::{AssignmentReport, AssignmentServiceError};
use training_core::model::{AssignmentDraft, FormationId, GroupId, TargetMode, UserId};

/// Raw assignment form fields, as typed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssignmentFormVm {
    pub mode: TargetMode,
    /// Comma or whitespace separated user ids.
    pub users_input: String,
    pub group_input: String,
    /// `YYYY-MM-DD`, empty for no due date.
    pub due_input: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormError {
    InvalidUserId(String),
    InvalidGroupId(String),
    InvalidDueDate(String),
}

impl FormError {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            FormError::InvalidUserId(raw) => format!("\"{raw}\" is not a valid user id."),
            FormError::InvalidGroupId(raw) => format!("\"{raw}\" is not a valid group id."),
            FormError::InvalidDueDate(raw) => {
                format!("\"{raw}\" is not a date (expected YYYY-MM-DD).")
            }
        }
    }
}

impl AssignmentFormVm {
    /// Parse the fields into a draft. Emptiness is checked by the draft's own validation.
    ///
    /// # Errors
    ///
    /// Returns `FormError` when an id or the due date does not parse.
    pub fn to_draft(&self, formation_id: FormationId) -> Result<AssignmentDraft, FormError> {
        let mut draft = AssignmentDraft::new(formation_id);
        draft.mode = self.mode;
        match self.mode {
            TargetMode::Users => {
                draft.users = self
                    .users_input
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|part| !part.is_empty())
                    .map(|part| {
                        part.parse::<UserId>()
                            .map_err(|_| FormError::InvalidUserId(part.to_string()))
                    })
                    .collect::<Result<_, _>>()?;
            }
            TargetMode::Group => {
                let raw = self.group_input.trim();
                if !raw.is_empty() {
                    draft.group = Some(
                        raw.parse::<GroupId>()
                            .map_err(|_| FormError::InvalidGroupId(raw.to_string()))?,
                    );
                }
            }
        }
        draft.due_at = parse_due_date(&self.due_input)?;
        Ok(draft)
    }
}

/// A due date covers its whole day: it is stored as the last second of that day (UTC).
fn parse_due_date(raw: &str) -> Result<Option<DateTime<Utc>>, FormError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| FormError::InvalidDueDate(raw.to_string()))?;
    let end = date
        .and_hms_opt(23, 59, 59)
        .ok_or_else(|| FormError::InvalidDueDate(raw.to_string()))?;
    Ok(Some(end.and_utc()))
}

#[must_use]
pub fn assignment_success_message(report: AssignmentReport) -> String {
    match report.applied {
        1 => "Formation assigned.".to_string(),
        n => format!("Formation assigned to {n} targets."),
    }
}

#[must_use]
pub fn assignment_error_message(err: &AssignmentServiceError) -> String {
    match err {
        AssignmentServiceError::Assignment(inner) => {
            let mut text = inner.to_string();
            if let Some(first) = text.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            format!("{text}.")
        }
        AssignmentServiceError::Partial { applied, total, .. } => {
            format!("Assigned {applied} of {total}, then the request failed. Earlier assignments were kept.")
        }
        _ => "Something went wrong. Please try again.".to_string(),
    }
}
