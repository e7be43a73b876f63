use crate::domain::model::{ProbabilityPolicy, RateRequest, Semantics};
use std::path::Path;

pub trait ConfigProvider {
    fn input_path(&self) -> &Path;
    fn output_path(&self) -> &Path;
    fn rate_request(&self) -> &RateRequest;
    fn semantics(&self) -> Semantics;
    fn probability_policy(&self) -> ProbabilityPolicy;
    fn seed(&self) -> Option<u64>;
    fn buffer_size(&self) -> usize;
}
