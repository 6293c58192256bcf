use freshmath_shared::controller::PendingSubmission;
use freshmath_shared::{
  GenerationResult,
  SubmissionOutcome
};
use gloo::net::http::Request;

/// Posts one generation request to the page's own origin. Error statuses
/// still carry a `{success, error}` body, so the body is decoded either way.
pub async fn send_generation(
  pending: &PendingSubmission
) -> SubmissionOutcome {
  match post_json(pending).await {
    | Ok(result) => {
      SubmissionOutcome::Completed(result)
    }
    | Err(message) => {
      tracing::error!(
        endpoint = pending.endpoint(),
        error = %message,
        "generation request failed"
      );
      SubmissionOutcome::Transport(
        message
      )
    }
  }
}

async fn post_json(
  pending: &PendingSubmission
) -> Result<GenerationResult, String> {
  let response =
    Request::post(pending.endpoint())
      .json(&pending.request)
      .map_err(|e| {
        format!(
          "failed to encode request: {e}"
        )
      })?
      .send()
      .await
      .map_err(|e| e.to_string())?;

  let status = response.status();
  response
    .json::<GenerationResult>()
    .await
    .map_err(|e| {
      format!(
        "unexpected response (HTTP \
         {status}): {e}"
      )
    })
}
