use qf_boundary::BoundaryError;
use qf_channel::ChannelError;
use qf_fluids::FluidError;
use qf_kinetics::KineticsError;
use qf_project::ProjectError;

pub type CliResult<T> = Result<T, CliError>;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Fluid(#[from] FluidError),

    #[error(transparent)]
    Boundary(#[from] BoundaryError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Kinetics(#[from] KineticsError),

    #[error("case '{case}' has no {section} section, needed by {command}")]
    MissingSection {
        case: String,
        section: &'static str,
        command: &'static str,
    },

    #[error("{failed} of {total} case(s) failed")]
    Failed { failed: usize, total: usize },
}
