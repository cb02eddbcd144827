//! User-facing report lines written to stdout after a run.
//!
//! `apply` prints nothing on success. `destroy` prints its success line even
//! after a failure; callers wanting a strict signal use the returned
//! [`crate::dispatcher::Outcome`] instead of parsing these lines.

use std::io::Write;

use crate::orchestrator::ProvisionError;

pub const PROVISION_FAILED: &str = "Failed to provision sandbox infrastructure:";
pub const DEPROVISION_FAILED: &str = "Failed to deprovision sandbox infrastructure:";
pub const DEPROVISIONED: &str = "Sandbox resources deprovisioned successfully.";

pub fn report_provision<W: Write>(
    out: &mut W,
    result: &Result<(), ProvisionError>,
) -> std::io::Result<()> {
    if let Err(err) = result {
        writeln!(out, "{} {}", PROVISION_FAILED, err)?;
    }
    out.flush()
}

pub fn report_deprovision<W: Write>(
    out: &mut W,
    result: &Result<(), ProvisionError>,
) -> std::io::Result<()> {
    if let Err(err) = result {
        writeln!(out, "{} {}", DEPROVISION_FAILED, err)?;
    }
    writeln!(out, "{}", DEPROVISIONED)?;
    out.flush()
}
