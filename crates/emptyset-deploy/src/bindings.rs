//! Typed interfaces for the contracts the migrations work with.

use alloy_sol_types::sol;

sol! {
    /// Digital Standard Unit, the stablecoin the reserve mints and burns.
    #[derive(Debug)]
    contract DSU {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function totalSupply() external view returns (uint256);
    }

    /// Redeems bridged USDC for native USDC backing the DSU reserve.
    #[derive(Debug)]
    contract MigrationReserve {
        constructor(address dsu_, address usdc_, address usdcBridged_);

        function DSU() external view returns (address);
        function USDC() external view returns (address);
        function USDC_BRIDGED() external view returns (address);
        function migrate(uint256 amount) external;
    }

    /// Greeting registry used to exercise the deploy and event plumbing
    /// end to end.
    #[derive(Debug)]
    contract Registry {
        event GreetingUpdated(string greeting);

        function greeting() external view returns (string);
        function updateGreeting(string calldata greeting) external;
    }
}
