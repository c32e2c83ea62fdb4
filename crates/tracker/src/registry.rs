use std::sync::Arc;

use aes::AesStrategy;
use common::{FeedStrategy, GenericStrategy, StrategyTag};
use cosmetics::CosmeticsStrategy;
use map::MapStrategy;
use news::NewsStrategy;
use playlists::PlaylistsStrategy;

pub fn strategy_for(tag: StrategyTag) -> Arc<dyn FeedStrategy> {
    match tag {
        StrategyTag::Generic => Arc::new(GenericStrategy),
        StrategyTag::News => Arc::new(NewsStrategy::new()),
        StrategyTag::Map => Arc::new(MapStrategy::new()),
        StrategyTag::Playlists => Arc::new(PlaylistsStrategy::new()),
        StrategyTag::Aes => Arc::new(AesStrategy::new()),
        StrategyTag::Cosmetics => Arc::new(CosmeticsStrategy::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tag_has_a_strategy() {
        let names: Vec<_> = [
            StrategyTag::Generic,
            StrategyTag::News,
            StrategyTag::Map,
            StrategyTag::Playlists,
            StrategyTag::Aes,
            StrategyTag::Cosmetics,
        ]
        .into_iter()
        .map(|tag| strategy_for(tag).name())
        .collect();

        assert_eq!(names, vec!["generic", "news", "map", "playlists", "aes", "cosmetics"]);
    }
}
