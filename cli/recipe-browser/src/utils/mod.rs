pub mod init;
pub mod message;
pub mod render;
pub mod terminal;

/// Render an error and its causes on one line, `outer: inner: innermost`.
pub fn display_chain(err: &anyhow::Error) -> String {
    err.chain()
        .skip(1)
        .fold(err.to_string(), |acc, cause| format!("{acc}: {cause}"))
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    #[test]
    fn chain_is_joined_outermost_first() {
        let err = Err::<(), _>(std::io::Error::other("connection refused"))
            .context("could not load recipes")
            .unwrap_err();
        assert_eq!(
            display_chain(&err),
            "could not load recipes: connection refused"
        );
    }
}
