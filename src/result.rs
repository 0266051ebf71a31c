//! The uniform outcome of a call.
//!
//! Every call made through a [`Client`](crate::Client) resolves to exactly
//! one [`NetworkResult`]: either the decoded value or a classified
//! [`NetworkError`].

use crate::NetworkError;

/// The outcome of a single request/response cycle.
///
/// # Examples
///
/// ```no_run
/// use netresult::{Client, NetworkResult};
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// # async fn example() -> Result<(), netresult::Error> {
/// let client = Client::builder()
///     .base_url("https://api.example.com")?
///     .build()?;
///
/// match client.get::<User>("/users/1").await {
///     NetworkResult::Success { data } => println!("Hello, {}", data.name),
///     NetworkResult::Error { error, message } => {
///         eprintln!("Call failed: {error} ({message:?})");
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub enum NetworkResult<T> {
    /// The call succeeded and the body decoded into `T`.
    Success {
        /// The decoded value.
        data: T,
    },

    /// The call failed.
    Error {
        /// The classified failure.
        error: NetworkError,
        /// Advisory text for logs or UI. Never parse it.
        message: Option<String>,
    },
}

impl<T> NetworkResult<T> {
    /// Creates a successful result.
    pub fn success(data: T) -> Self {
        NetworkResult::Success { data }
    }

    /// Creates a failed result, using the error's display text as the message.
    pub fn failure(error: NetworkError) -> Self {
        let message = Some(error.to_string());
        NetworkResult::Error { error, message }
    }

    /// Returns `true` if this is [`NetworkResult::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, NetworkResult::Success { .. })
    }

    /// Returns `true` if this is [`NetworkResult::Error`].
    pub fn is_error(&self) -> bool {
        matches!(self, NetworkResult::Error { .. })
    }

    /// Returns a reference to the decoded value, if any.
    pub fn data(&self) -> Option<&T> {
        match self {
            NetworkResult::Success { data } => Some(data),
            NetworkResult::Error { .. } => None,
        }
    }

    /// Consumes the result and returns the decoded value, if any.
    pub fn into_data(self) -> Option<T> {
        match self {
            NetworkResult::Success { data } => Some(data),
            NetworkResult::Error { .. } => None,
        }
    }

    /// Returns the classified error, if any.
    pub fn error(&self) -> Option<&NetworkError> {
        match self {
            NetworkResult::Success { .. } => None,
            NetworkResult::Error { error, .. } => Some(error),
        }
    }

    /// Returns the advisory message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            NetworkResult::Success { .. } => None,
            NetworkResult::Error { message, .. } => message.as_deref(),
        }
    }

    /// Maps the decoded value, leaving errors untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use netresult::NetworkResult;
    ///
    /// let result = NetworkResult::success(41).map(|n| n + 1);
    /// assert_eq!(result.data(), Some(&42));
    /// ```
    pub fn map<U, F>(self, f: F) -> NetworkResult<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            NetworkResult::Success { data } => NetworkResult::Success { data: f(data) },
            NetworkResult::Error { error, message } => NetworkResult::Error { error, message },
        }
    }

    /// Converts into a standard `Result`, dropping the advisory message.
    pub fn into_result(self) -> Result<T, NetworkError> {
        match self {
            NetworkResult::Success { data } => Ok(data),
            NetworkResult::Error { error, .. } => Err(error),
        }
    }
}

impl<T> From<NetworkResult<T>> for Result<T, NetworkError> {
    fn from(result: NetworkResult<T>) -> Self {
        result.into_result()
    }
}
