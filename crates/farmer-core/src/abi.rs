//! Contract interfaces for the on-chain actions.

use alloy_sol_types::sol;

sol! {
	/// Minimal ERC-20 surface the executors need.
	interface IERC20 {
		function approve(address spender, uint256 amount) external returns (bool);
	}

	/// Wrapped-native token; `deposit` wraps the attached value.
	interface IWrappedNative {
		function deposit() external payable;
	}

	/// Single-pool exact-input swap parameters.
	struct ExactInputSingleParams {
		address tokenIn;
		address tokenOut;
		uint24 fee;
		address recipient;
		uint256 amountIn;
		uint256 amountOutMinimum;
		uint160 sqrtPriceLimitX96;
	}

	/// Swap router; swaps are wrapped in a deadline-carrying multicall.
	interface ISwapRouter {
		function exactInputSingle(ExactInputSingleParams calldata params) external payable returns (uint256 amountOut);
		function multicall(uint256 deadline, bytes[] calldata data) external payable returns (bytes[] memory results);
	}

	/// Liquidity mint parameters.
	struct MintParams {
		address token0;
		address token1;
		uint24 fee;
		int24 tickLower;
		int24 tickUpper;
		uint256 amount0Desired;
		uint256 amount1Desired;
		uint256 amount0Min;
		uint256 amount1Min;
		address recipient;
		uint256 deadline;
	}

	/// Position manager used for liquidity additions.
	interface INonfungiblePositionManager {
		function mint(MintParams calldata params) external payable returns (uint256 tokenId, uint128 liquidity, uint256 amount0, uint256 amount1);
	}
}
