//! Method Body Disassembler: decodes one method and resolves its call sites.
//!
//! The result, a [`MethodBodyDescriptor`], holds the full opcode sequence and the positions of
//! the call instructions that resolved to loaded methods. Call sites that do not resolve are left
//! out of the mapping without an error; compare [`MethodBodyDescriptor::call_site_count`] with
//! [`MethodBodyDescriptor::resolved_count`] (or use
//! [`MethodBodyDescriptor::unresolved_positions`]) for a full account.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ilmock::{
//!     disassembler::{DisassemblyConfig, MethodBodyDisassembler},
//!     metadata::{method::CilMethod, module::Module},
//! };
//!
//! # fn example(module: &Module, method: &CilMethod) -> ilmock::Result<()> {
//! let descriptor = MethodBodyDisassembler::new(module)
//!     .with_config(DisassemblyConfig::call_sites())
//!     .disassemble(method)?;
//!
//! for (position, target) in descriptor.iter() {
//!     println!("IL#{position}: {} {}", descriptor.opcodes()[position].mnemonic, target.fullname());
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;

use log::debug;

use crate::{
    disassembler::{decode_stream_with_mode, OpcodeDescriptor, OperandMode},
    metadata::{
        memberresolver::MemberResolver, method::CilMethod, method::MethodRc, module::Module,
        signatures::MAX_SIGNATURE_DEPTH,
    },
    Error::InvalidConfiguration,
    Result,
};

/// Configuration for [`MethodBodyDisassembler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisassemblyConfig {
    /// How inline operands are decoded (default: only call tokens are consumed)
    pub operand_mode: OperandMode,

    /// Whether methods inherited from base types are matched against call sites (default: true)
    pub include_inherited: bool,

    /// Maximum nesting depth for signature decoding and type resolution (default: 50)
    pub max_signature_depth: usize,
}

impl Default for DisassemblyConfig {
    fn default() -> Self {
        Self {
            operand_mode: OperandMode::CallTokensOnly,
            include_inherited: true,
            max_signature_depth: MAX_SIGNATURE_DEPTH,
        }
    }
}

impl DisassemblyConfig {
    /// Creates the default configuration: only `call` / `callvirt` operands are consumed
    #[must_use]
    pub fn call_sites() -> Self {
        Self::default()
    }

    /// Creates a configuration that skips every inline operand by its encoded size
    ///
    /// Use this for bodies that contain branches, switches or inline constants whose operand
    /// bytes would otherwise be read as opcodes.
    #[must_use]
    pub fn full_operands() -> Self {
        Self {
            operand_mode: OperandMode::Full,
            ..Self::default()
        }
    }
}

/// The disassembly of one method body.
///
/// A snapshot: the opcode sequence plus the mapping from instruction position to the resolved
/// call target.
#[derive(Debug, Clone)]
pub struct MethodBodyDescriptor {
    opcodes: Vec<&'static OpcodeDescriptor>,
    call_sites: Vec<usize>,
    resolved: BTreeMap<usize, MethodRc>,
}

impl MethodBodyDescriptor {
    /// One descriptor per instruction, in stream order
    #[must_use]
    pub fn opcodes(&self) -> &[&'static OpcodeDescriptor] {
        &self.opcodes
    }

    /// Positions of all `call` / `callvirt` instructions, ascending
    #[must_use]
    pub fn call_sites(&self) -> &[usize] {
        &self.call_sites
    }

    /// The mapping from instruction position to resolved method
    #[must_use]
    pub fn resolved(&self) -> &BTreeMap<usize, MethodRc> {
        &self.resolved
    }

    /// Number of call instructions in the body
    #[must_use]
    pub fn call_site_count(&self) -> usize {
        self.call_sites.len()
    }

    /// Number of call instructions that resolved
    #[must_use]
    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }

    /// The method called at `position`, if that instruction is a resolved call
    #[must_use]
    pub fn resolved_at(&self, position: usize) -> Option<&MethodRc> {
        self.resolved.get(&position)
    }

    /// Positions of call instructions without a resolved target
    pub fn unresolved_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.call_sites
            .iter()
            .copied()
            .filter(|position| !self.resolved.contains_key(position))
    }

    /// Resolved call sites as `(position, method)`, positions ascending
    pub fn iter(&self) -> impl Iterator<Item = (usize, &MethodRc)> + '_ {
        self.resolved.iter().map(|(position, method)| (*position, method))
    }
}

/// Disassembles method bodies of one hosting module.
pub struct MethodBodyDisassembler<'a> {
    module: &'a Module,
    config: DisassemblyConfig,
}

impl<'a> MethodBodyDisassembler<'a> {
    /// Create a disassembler with the default configuration
    #[must_use]
    pub fn new(module: &'a Module) -> Self {
        MethodBodyDisassembler {
            module,
            config: DisassemblyConfig::default(),
        }
    }

    /// Replace the configuration
    #[must_use]
    pub fn with_config(mut self, config: DisassemblyConfig) -> Self {
        self.config = config;
        self
    }

    /// The active configuration
    #[must_use]
    pub fn config(&self) -> &DisassemblyConfig {
        &self.config
    }

    /// Decode the body of `method` and resolve its call sites.
    ///
    /// Each call uses a fresh [`MemberResolver`], so nothing is cached across calls.
    ///
    /// # Errors
    /// - [`crate::Error::NoMethodBody`] if the method has no CIL body
    /// - [`crate::Error::Malformed`] for undecodable instructions or damaged metadata
    /// - [`crate::Error::InvalidConfiguration`] for a zero signature depth
    pub fn disassemble(&self, method: &CilMethod) -> Result<MethodBodyDescriptor> {
        if self.config.max_signature_depth == 0 {
            return Err(InvalidConfiguration(
                "max_signature_depth must be at least 1".to_string(),
            ));
        }

        let instructions = method.instructions()?;
        let stream = decode_stream_with_mode(instructions, self.config.operand_mode)?;

        let mut resolver = MemberResolver::new(self.module)
            .with_inherited(self.config.include_inherited)
            .with_max_depth(self.config.max_signature_depth);

        let mut call_sites = Vec::with_capacity(stream.operands.len());
        let mut resolved = BTreeMap::new();
        for operand in stream.operands.iter().filter(|operand| operand.opcode.is_call()) {
            call_sites.push(operand.position);

            match resolver.resolve(operand)? {
                Some(target) => {
                    resolved.insert(operand.position, target);
                }
                None => debug!(
                    "{}: {} {} at IL_{:04x} does not resolve, omitted",
                    method.fullname(),
                    operand.opcode.mnemonic,
                    operand.token,
                    operand.offset
                ),
            }
        }

        Ok(MethodBodyDescriptor {
            opcodes: stream.instructions,
            call_sites,
            resolved,
        })
    }
}

/// Disassemble `method` with the default configuration.
///
/// # Errors
/// See [`MethodBodyDisassembler::disassemble`].
pub fn disassemble_method(module: &Module, method: &CilMethod) -> Result<MethodBodyDescriptor> {
    MethodBodyDisassembler::new(module).disassemble(method)
}
