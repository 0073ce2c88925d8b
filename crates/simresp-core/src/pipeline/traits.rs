use super::{ChannelOutcome, ReductionSummary};
use crate::domain::{ChannelRequest, ResponseResult};

pub trait ChannelSource {
    fn channels(&mut self) -> ResponseResult<Vec<ChannelRequest>>;
}

pub trait ReductionSink {
    fn accept(&mut self, outcome: ChannelOutcome) -> ResponseResult<()>;

    fn finish(&mut self, _summary: &ReductionSummary) -> ResponseResult<()> {
        Ok(())
    }
}

impl ChannelSource for Vec<ChannelRequest> {
    fn channels(&mut self) -> ResponseResult<Vec<ChannelRequest>> {
        Ok(std::mem::take(self))
    }
}

impl ReductionSink for Vec<ChannelOutcome> {
    fn accept(&mut self, outcome: ChannelOutcome) -> ResponseResult<()> {
        self.push(outcome);
        Ok(())
    }
}
