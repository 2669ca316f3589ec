//! Functions provided by the r0 virtual machine runtime.
//!
//! Single source of truth for builtin signatures: the analyzer installs
//! these into the outermost scope, and the code generator reads the
//! return type when lowering `callname`.
use crate::parsing::VarType;

pub struct Builtin {
    pub name: &'static str,
    pub params: &'static [VarType],
    pub return_type: VarType,
}

/// All functions the VM makes available to every program.
#[rustfmt::skip]
pub static BUILTINS: &[Builtin] = &[
    Builtin { name: "getint",    params: &[],                return_type: VarType::Int },
    Builtin { name: "getdouble", params: &[],                return_type: VarType::Double },
    Builtin { name: "getchar",   params: &[],                return_type: VarType::Int },
    Builtin { name: "putint",    params: &[VarType::Int],    return_type: VarType::Void },
    Builtin { name: "putdouble", params: &[VarType::Double], return_type: VarType::Void },
    Builtin { name: "putchar",   params: &[VarType::Int],    return_type: VarType::Void },
    Builtin { name: "putln",     params: &[],                return_type: VarType::Void },
];

pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|builtin| builtin.name == name)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lookup() {
        let putint = lookup("putint").unwrap();
        assert_eq!(putint.params, &[VarType::Int]);
        assert_eq!(putint.return_type, VarType::Void);
        assert!(lookup("putstr").is_none());
    }
}
