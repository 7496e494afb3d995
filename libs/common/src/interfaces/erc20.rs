use alloy_sol_types::sol;

sol! {
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);

        function allowance(address owner, address spender) external view returns (uint256);
    }
}
