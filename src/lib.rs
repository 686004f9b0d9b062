//! Workspace-level tooling package. Hosts the rusty-hook pre-commit configuration.
