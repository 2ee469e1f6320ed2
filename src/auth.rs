use crate::models::{AuthUser, Session};
use crate::remote::RemoteStore;
use crate::store::RemoteError;

/// The one definition of "verified" in the crate. Both the sign-in flow
/// and the protected-route check go through here.
pub fn is_email_verified(user: &AuthUser) -> bool {
    user.email_confirmed_at.is_some() || user.confirmed_at.is_some()
}

/// Route accessibility for protected screens: no user, or an unverified
/// one, is sent back to the auth screen.
pub fn dashboard_access(user: Option<&AuthUser>) -> bool {
    user.map(is_email_verified).unwrap_or(false)
}

/// What the auth screen does with a successful credential check.
#[derive(Debug, Clone, PartialEq)]
pub enum SignInOutcome {
    /// Proceed to the dashboard.
    Verified(Session),
    /// Credentials are good but the email is unconfirmed; the UI shows
    /// the verify notice and offers a resend.
    Unverified(Session),
}

/// Signs in, re-fetches the current user, and classifies the session by
/// verification state.
pub async fn sign_in_flow(
    store: &RemoteStore,
    email: &str,
    password: &str,
) -> Result<SignInOutcome, RemoteError> {
    let session = store.sign_in(email, password).await?;
    let user = store.current_user(&session).await?;
    let session = Session {
        access_token: session.access_token,
        user,
    };
    if is_email_verified(&session.user) {
        log::info!("sign-in: {} verified", session.user.email);
        Ok(SignInOutcome::Verified(session))
    } else {
        log::info!("sign-in: {} awaiting email verification", session.user.email);
        Ok(SignInOutcome::Unverified(session))
    }
}
