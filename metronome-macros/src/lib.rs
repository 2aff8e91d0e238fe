mod utils;

use proc_macro::{Delimiter, Group, TokenStream, TokenTree};
use utils::ClockArg;

/// What the expanded function is for.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Entry {
    Main,
    Test,
}

/// Runs `main` on a fresh event loop.
///
/// The function may take a single `&EventLoop` parameter. Its body runs as
/// the loop's first synchronous work; the loop then runs until no work and
/// no timers remain. Uses the system clock unless `clock = virtual` is
/// given.
#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    match utils::parse_clock(attr) {
        Ok(clock) => expand(item, clock.unwrap_or(ClockArg::Real), Entry::Main),
        Err(message) => utils::compile_error(&message),
    }
}

/// Turns a function into a `#[test]` running on a fresh event loop.
///
/// The function may take a single `&EventLoop` parameter. Its body runs as
/// the loop's first synchronous work, after which the loop runs until idle.
/// Uses a virtual clock unless `clock = real` is given.
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    match utils::parse_clock(attr) {
        Ok(clock) => expand(item, clock.unwrap_or(ClockArg::Virtual), Entry::Test),
        Err(message) => utils::compile_error(&message),
    }
}

fn expand(item: TokenStream, clock: ClockArg, entry: Entry) -> TokenStream {
    let mut tokens: Vec<TokenTree> = item.into_iter().collect();

    let Some(body_pos) = utils::find_body(&tokens) else {
        return utils::compile_error("expected a function with a body");
    };

    let Some(params_pos) = utils::find_params(&tokens[..body_pos]) else {
        return utils::compile_error("expected a function parameter list");
    };

    let block = match &tokens[body_pos] {
        TokenTree::Group(g) => g.stream().to_string(),
        _ => unreachable!(),
    };

    let params = match &tokens[params_pos] {
        TokenTree::Group(g) => utils::closure_params(&g.stream().to_string()),
        _ => unreachable!(),
    };

    let builder = format!(
        "::metronome::EventLoopBuilder::new(){}.build()",
        clock.builder_call()
    );

    let new_block = match entry {
        Entry::Main => format!(
            "{{
                let event_loop = {builder};
                let output = event_loop.block_on(|{params}| {{ {block} }});
                event_loop.run();
                output
            }}"
        ),
        Entry::Test => format!(
            "{{
                let event_loop = {builder};
                event_loop.block_on(|{params}| {{ {block} }})
            }}"
        ),
    };

    let Ok(new_block) = new_block.parse::<TokenStream>() else {
        return utils::compile_error("failed to expand the function body");
    };

    tokens[body_pos] = TokenTree::Group(Group::new(Delimiter::Brace, new_block));
    tokens[params_pos] = TokenTree::Group(Group::new(Delimiter::Parenthesis, TokenStream::new()));

    if entry == Entry::Main {
        return tokens.into_iter().collect();
    }

    let test_attr: TokenStream = "#[test]".parse().unwrap_or_default();
    let mut result: Vec<TokenTree> = test_attr.into_iter().collect();
    result.extend(tokens);

    result.into_iter().collect()
}
