/// Collection transforms: `map`, `filter`, `fold`, access and conversion.
pub mod collections;
/// The injected-I/O calls: `puts` and `read`.
pub mod io;
/// `type` and `assert`.
pub mod misc;
/// The operator functions behind `+`, `==`, `..`, `|>` and friends.
pub mod operators;
/// Lazy sequence constructors and consumers.
pub mod sequences;
/// String operations.
pub mod strings;

use crate::interpreter::{
    environment::{EnvArena, EnvRef},
    value::{
        core::Value,
        function::{BuiltinArity::{Exact, OneOf, Variadic}, BuiltinDef},
    },
};

/// Defines the builtin registry.
///
/// Each entry provides a name, an arity specification and the handler
/// function. The macro produces `BUILTIN_TABLE`, the static table the root
/// scope is populated from.
macro_rules! builtin_functions {
    (
        $(
            $name:literal => {
                arity: $arity:expr,
                func: $func:expr $(,)?
            }
        ),* $(,)?
    ) => {
        /// Every builtin, in registration order.
        pub static BUILTIN_TABLE: &[BuiltinDef] = &[
            $(
                BuiltinDef { name: $name, arity: $arity, func: $func },
            )*
        ];
    };
}

builtin_functions! {
    // Operators. These are ordinary bindings: user code can shadow them,
    // pass them through `|>`, or partially apply them with `_`.
    "+"    => { arity: Exact(2), func: operators::add },
    "-"    => { arity: Exact(2), func: operators::subtract },
    "*"    => { arity: Exact(2), func: operators::multiply },
    "/"    => { arity: Exact(2), func: operators::divide },
    "%"    => { arity: Exact(2), func: operators::modulo },
    "=="   => { arity: Exact(2), func: operators::equal },
    "!="   => { arity: Exact(2), func: operators::not_equal },
    "<"    => { arity: Exact(2), func: operators::less },
    "<="   => { arity: Exact(2), func: operators::less_eq },
    ">"    => { arity: Exact(2), func: operators::greater },
    ">="   => { arity: Exact(2), func: operators::greater_eq },
    ".."   => { arity: Exact(2), func: operators::range_exclusive },
    "..="  => { arity: Exact(2), func: operators::range_inclusive },
    "|>"   => { arity: Exact(2), func: operators::pipeline },
    ">>"   => { arity: Exact(2), func: operators::compose },

    // Collections.
    "map"      => { arity: Exact(2), func: collections::map },
    "filter"   => { arity: Exact(2), func: collections::filter },
    "fold"     => { arity: Exact(3), func: collections::fold },
    "reduce"   => { arity: Exact(2), func: collections::reduce },
    "each"     => { arity: Exact(2), func: collections::each },
    "flat_map" => { arity: Exact(2), func: collections::flat_map },
    "find"     => { arity: Exact(2), func: collections::find },
    "count"    => { arity: Exact(2), func: collections::count },
    "size"     => { arity: Exact(1), func: collections::size },
    "get"      => { arity: Exact(2), func: collections::get },
    "push"     => { arity: Exact(2), func: collections::push },
    "push!"    => { arity: Exact(2), func: collections::push_mut },
    "assoc"    => { arity: Exact(3), func: collections::assoc },
    "update"   => { arity: Exact(3), func: collections::update },
    "zip"      => { arity: Exact(2), func: collections::zip },
    "range"    => { arity: Exact(3), func: collections::range },
    "first"    => { arity: Exact(1), func: collections::first },
    "last"     => { arity: Exact(1), func: collections::last },
    "rest"     => { arity: Exact(1), func: collections::rest },
    "sort"     => { arity: Exact(2), func: collections::sort },
    "reverse"  => { arity: Exact(1), func: collections::reverse },
    "keys"     => { arity: Exact(1), func: collections::keys },
    "values"   => { arity: Exact(1), func: collections::values },
    "entries"  => { arity: Exact(1), func: collections::entries },
    "sum"      => { arity: Exact(1), func: collections::sum },
    "min"      => { arity: Exact(1), func: collections::min },
    "max"      => { arity: Exact(1), func: collections::max },
    "contains" => { arity: Exact(2), func: collections::contains },
    "unique"   => { arity: Exact(1), func: collections::unique },
    "to_list"  => { arity: Exact(1), func: collections::to_list },
    "to_set"   => { arity: Exact(1), func: collections::to_set },
    "to_dict"  => { arity: Exact(1), func: collections::to_dict },
    "asMutable"   => { arity: Exact(1), func: collections::as_mutable },
    "asImmutable" => { arity: Exact(1), func: collections::as_immutable },

    // Strings.
    "split" => { arity: Exact(2), func: strings::split },
    "join"  => { arity: Exact(2), func: strings::join },
    "trim"  => { arity: Exact(1), func: strings::trim },
    "lines" => { arity: Exact(1), func: strings::lines },
    "chars" => { arity: Exact(1), func: strings::chars },
    "int"   => { arity: Exact(1), func: strings::int },
    "str"   => { arity: Exact(1), func: strings::str },

    // Lazy sequences.
    "iterate" => { arity: Exact(2), func: sequences::iterate },
    "take"    => { arity: Exact(2), func: sequences::take },
    "drop"    => { arity: Exact(2), func: sequences::drop },
    "cycle"   => { arity: Exact(1), func: sequences::cycle },
    "repeat"  => { arity: Exact(1), func: sequences::repeat },

    // I/O through the injected handle.
    "puts" => { arity: Variadic, func: io::puts },
    "read" => { arity: Exact(1), func: io::read },

    // Introspection.
    "type"   => { arity: Exact(1), func: misc::type_of },
    "assert" => { arity: OneOf(&[1, 2]), func: misc::assert },
}

/// Declares every builtin into the root scope.
pub fn register(envs: &mut EnvArena, root: EnvRef) {
    for def in BUILTIN_TABLE {
        envs.declare(root, def.name, Value::Builtin(def), false);
    }
}

/// Splits a two-argument builtin's arguments. Arity is checked before
/// dispatch, so missing slots only occur through internal misuse and decay
/// to `nil`.
pub(crate) fn two(mut args: Vec<Value>) -> (Value, Value) {
    let b = args.pop().unwrap_or(Value::Nil);
    let a = args.pop().unwrap_or(Value::Nil);
    (a, b)
}

/// Splits a three-argument builtin's arguments.
pub(crate) fn three(mut args: Vec<Value>) -> (Value, Value, Value) {
    let c = args.pop().unwrap_or(Value::Nil);
    let (a, b) = two(args);
    (a, b, c)
}

/// Splits a one-argument builtin's arguments.
pub(crate) fn one(mut args: Vec<Value>) -> Value {
    args.pop().unwrap_or(Value::Nil)
}
