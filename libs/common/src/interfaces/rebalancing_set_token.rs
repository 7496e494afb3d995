use alloy_sol_types::sol;

sol! {
    /// Read surface of a rebalancing set token.
    ///
    /// `rebalanceState` returns the lifecycle enum as its raw code:
    /// 0 = Default, 1 = Proposal, 2 = Rebalance.
    interface IRebalancingSetToken {
        function manager() external view returns (address);

        function rebalanceState() external view returns (uint8);

        function lastRebalanceTimestamp() external view returns (uint256);

        function rebalanceInterval() external view returns (uint256);

        function proposalStartTime() external view returns (uint256);

        function proposalPeriod() external view returns (uint256);

        function minimumBid() external view returns (uint256);

        function remainingCurrentSets() external view returns (uint256);

        function getCombinedTokenArray() external view returns (address[] memory);

        function getBidPrice(uint256 quantity) external view returns (
            uint256[] memory,   // inflow per combined token
            uint256[] memory);  // outflow per combined token
    }
}
