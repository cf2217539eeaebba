use anyhow::{anyhow, Result};
use jaq_core::{compile::Undefined, load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;

/// Reshape one resolver document with a jq filter; every filter output is
/// decoded as a separate package document. `source` names the document in
/// error messages.
pub fn run_jaq(filter_src: &str, input: &Value, source: &str) -> Result<Vec<Value>> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader
        .load(&arena, program)
        .map_err(|errs| filter_load_error(errs, source))?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(|errs| filter_compile_error(errs, source))?;

    let inputs = RcIter::new(core::iter::empty());
    let outputs = filter.run((Ctx::new([], &inputs), Val::from(input.clone())));

    outputs
        .enumerate()
        .map(|(index, item)| {
            let doc = item.map_err(|e| anyhow!("jq filter failed on {source} (output #{index}): {e:?}"))?;
            // Val: Display -> JSON text
            serde_json::from_str::<Value>(&doc.to_string())
                .map_err(|e| anyhow!("jq output #{index} for {source} is not JSON: {e}"))
        })
        .collect()
}

fn filter_load_error(errs: Vec<(load::File<&str, ()>, load::Error<&str>)>, source: &str) -> anyhow::Error {
    let lines: Vec<String> = errs
        .into_iter()
        .map(|(file, err)| format!("  cannot parse `{}`: {err:?}", file.code))
        .collect();
    anyhow!("invalid jq filter for {source}:\n{}", lines.join("\n"))
}

fn filter_compile_error(
    errs: Vec<(load::File<&str, ()>, Vec<(&str, Undefined)>)>,
    source: &str,
) -> anyhow::Error {
    let lines: Vec<String> = errs
        .into_iter()
        .flat_map(|(file, list)| {
            list.into_iter()
                .map(move |(name, undef)| format!("  `{name}` is undefined ({undef:?}) in `{}`", file.code))
        })
        .collect();
    anyhow!("invalid jq filter for {source}:\n{}", lines.join("\n"))
}
