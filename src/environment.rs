use crate::runtime::Value;
use chainmap::ChainMap;

/// Lexical scope chain. A block scope is `env.extend()`; dropping it when the
/// block ends is what discards its bindings.
pub type Environment = ChainMap<String, Value>;

/// Overwrites the nearest existing binding of `name`. Returns `false`
/// without creating anything when no scope in the chain defines it.
pub fn assign(env: &mut Environment, name: &String, value: Value) -> bool {
    match env.get(name) {
        Some(_) => {
            env.update_or(name, value);
            true
        }
        None => false,
    }
}
