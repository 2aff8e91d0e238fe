use proc_macro::{Delimiter, TokenStream, TokenTree};

/// Clock requested through the `clock = ...` attribute argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ClockArg {
    Real,
    Virtual,
}

impl ClockArg {
    /// Builder call selecting this clock.
    pub(crate) fn builder_call(self) -> &'static str {
        match self {
            ClockArg::Real => ".real_clock()",
            ClockArg::Virtual => ".virtual_clock()",
        }
    }
}

/// Parses the attribute arguments of `main` and `test`.
///
/// The only recognised argument is `clock = real` or `clock = virtual`
/// (quotes optional). Returns `Ok(None)` if no clock was requested.
pub(crate) fn parse_clock(attr: TokenStream) -> Result<Option<ClockArg>, String> {
    let attr_str = attr.to_string();
    let mut clock = None;

    for part in attr_str.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let Some(value) = part.strip_prefix("clock") else {
            return Err(format!("unknown argument `{part}`, expected `clock = real | virtual`"));
        };

        let value = value.trim().trim_start_matches('=').trim().trim_matches('"');

        clock = Some(match value {
            "real" => ClockArg::Real,
            "virtual" => ClockArg::Virtual,
            other => return Err(format!("unknown clock `{other}`, expected `real` or `virtual`")),
        });
    }

    Ok(clock)
}

/// Returns the index of the function's parameter list.
///
/// This is the first parenthesized group following the `fn` keyword, so
/// tuple return types are never mistaken for it.
pub(crate) fn find_params(tokens: &[TokenTree]) -> Option<usize> {
    let fn_pos = tokens
        .iter()
        .position(|t| matches!(t, TokenTree::Ident(id) if id.to_string() == "fn"))?;

    tokens[fn_pos..]
        .iter()
        .position(|t| matches!(t, TokenTree::Group(g) if g.delimiter() == Delimiter::Parenthesis))
        .map(|offset| fn_pos + offset)
}

/// Returns the index of the function body.
pub(crate) fn find_body(tokens: &[TokenTree]) -> Option<usize> {
    tokens
        .iter()
        .rposition(|t| matches!(t, TokenTree::Group(g) if g.delimiter() == Delimiter::Brace))
}

/// Turns the function's parameter list into closure parameters for
/// `EventLoop::block_on`.
pub(crate) fn closure_params(params: &str) -> String {
    let params = params.trim().trim_end_matches(',');

    if params.is_empty() {
        "_: &::metronome::EventLoop".to_string()
    } else {
        params.to_string()
    }
}

/// Emits a `compile_error!` carrying `message`.
pub(crate) fn compile_error(message: &str) -> TokenStream {
    format!("compile_error!({message:?});")
        .parse()
        .unwrap_or_default()
}
