use crate::error::Result;

/// Two-phase execution protocol of a pipeline stage.
///
/// A driver first lets the stage negotiate how much input it needs, then
/// asks it to compute its output. Both phases run once per execution, in
/// that order.
pub trait PipelineStage {
    /// Works out the input region needed for the current output request
    /// and announces it upstream.
    fn generate_input_requested_region(&mut self) -> Result<()>;

    /// Pulls the negotiated input and computes the output.
    fn generate_data(&mut self) -> Result<()>;
}

/// Runs one execution of `stage`, stopping at the first failing phase.
pub fn update<P: PipelineStage + ?Sized>(stage: &mut P) -> Result<()> {
    stage.generate_input_requested_region()?;
    stage.generate_data()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::DerivativeError;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
        fail_negotiation: bool,
    }

    impl PipelineStage for Recorder {
        fn generate_input_requested_region(&mut self) -> Result<()> {
            self.calls.push("negotiate");
            if self.fail_negotiation {
                return Err(DerivativeError::RegionNotNegotiated);
            }
            Ok(())
        }

        fn generate_data(&mut self) -> Result<()> {
            self.calls.push("generate");
            Ok(())
        }
    }

    #[test]
    fn test_phases_run_in_order() {
        let mut stage = Recorder::default();
        update(&mut stage).unwrap();

        assert_eq!(stage.calls, vec!["negotiate", "generate"]);
    }

    #[test]
    fn test_failed_negotiation_skips_generation() {
        let mut stage = Recorder {
            fail_negotiation: true,
            ..Default::default()
        };

        assert!(update(&mut stage).is_err());
        assert_eq!(stage.calls, vec!["negotiate"]);
    }
}
