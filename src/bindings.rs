//! Solidity bindings for the Orion protocol contracts: root
//! configuration, liquidity orchestrator, transparent vault factory,
//! transparent vault, and deposit access control.
//!
//! The packaged artifacts under `abis/` describe the same interfaces;
//! `ContractRegistry` checks at load time that every selector and event
//! declared here exists in the loaded artifact.

use alloy::sol;

sol!(
    #![sol(all_derives = true)]
    #[derive(serde::Serialize, serde::Deserialize)]
    interface IOrionConfig {
        function underlyingAsset() external view returns (address);
        function strategistIntentDecimals() external view returns (uint8);
        function getTokenDecimals(address token) external view returns (uint8);
        function riskFreeRate() external view returns (uint16);
        function getAllWhitelistedAssets() external view returns (address[] memory);
        function getAllWhitelistedAssetNames() external view returns (string[] memory);
        function isWhitelisted(address asset) external view returns (bool);
        function isWhitelistedManager(address manager) external view returns (bool);
        function getAllOrionVaults(uint8 vaultType) external view returns (address[] memory);
        function minDepositAmount() external view returns (uint256);
        function minRedeemAmount() external view returns (uint256);
        function vFeeCoefficient() external view returns (uint16);
        function rsFeeCoefficient() external view returns (uint16);
        function feeChangeCooldownDuration() external view returns (uint256);
        function maxFulfillBatchSize() external view returns (uint256);
        function isSystemIdle() external view returns (bool);
        function liquidityOrchestrator() external view returns (address);
        function transparentVaultFactory() external view returns (address);
    }
);

sol!(
    #![sol(all_derives = true)]
    #[derive(serde::Serialize, serde::Deserialize)]
    interface ILiquidityOrchestrator {
        function targetBufferRatio() external view returns (uint256);
        function slippageTolerance() external view returns (uint256);
        function epochDuration() external view returns (uint32);
    }
);

sol!(
    #![sol(all_derives = true)]
    #[derive(serde::Serialize, serde::Deserialize)]
    interface ITransparentVaultFactory {
        event OrionVaultCreated(
            address indexed vault,
            address indexed manager,
            address indexed strategist,
            string name,
            string symbol,
            uint8 vaultType
        );

        function createVault(
            address strategist,
            string calldata name,
            string calldata symbol,
            uint8 feeType,
            uint16 performanceFee,
            uint16 managementFee,
            address depositAccessControl
        ) external returns (address vault);
    }
);

sol!(
    #![sol(all_derives = true)]
    #[derive(serde::Serialize, serde::Deserialize)]
    interface IOrionTransparentVault {
        struct FeeModel {
            uint8 feeType;
            uint16 performanceFee;
            uint16 managementFee;
            uint256 highWaterMark;
        }

        struct IntentPosition {
            address token;
            uint32 weight;
        }

        event DepositRequest(address indexed sender, uint256 assets);
        event DepositRequestCancelled(address indexed user, uint256 amount);
        event RedeemRequest(address indexed sender, uint256 shares);
        event RedeemRequestCancelled(address indexed user, uint256 shares);
        event StrategistUpdated(address indexed newStrategist);
        event FeeModelUpdated(uint8 feeType, uint16 performanceFee, uint16 managementFee);
        event DepositAccessControlUpdated(address indexed newDepositAccessControl);
        event VaultFeesClaimed(address indexed manager, uint256 amount);
        event OrderSubmitted(address indexed strategist, IntentPosition[] order);
        event Transfer(address indexed from, address indexed to, uint256 value);

        function MAX_PERFORMANCE_FEE() external view returns (uint16);
        function MAX_MANAGEMENT_FEE() external view returns (uint16);
        function manager() external view returns (address);
        function strategist() external view returns (address);
        function isDecommissioning() external view returns (bool);
        function activeFeeModel() external view returns (FeeModel memory);
        function pendingDeposit(uint256 fulfillBatchSize) external view returns (uint256);
        function pendingRedeem(uint256 fulfillBatchSize) external view returns (uint256);
        function totalAssets() external view returns (uint256);
        function pendingVaultFees() external view returns (uint256);
        function decimals() external view returns (uint8);
        function convertToAssets(uint256 shares) external view returns (uint256);
        function getPortfolio()
            external
            view
            returns (address[] memory tokens, uint256[] memory sharesPerAsset);
        function depositAccessControl() external view returns (address);
        function maxDeposit(address receiver) external view returns (uint256);

        function requestDeposit(uint256 assets) external;
        function cancelDepositRequest(uint256 amount) external;
        function requestRedeem(uint256 shares) external;
        function cancelRedeemRequest(uint256 shares) external;
        function updateStrategist(address newStrategist) external;
        function updateFeeModel(uint8 feeType, uint16 performanceFee, uint16 managementFee) external;
        function setDepositAccessControl(address newDepositAccessControl) external;
        function claimVaultFees(uint256 amount) external;
        function submitIntent(IntentPosition[] calldata order) external;
    }
);

sol!(
    #![sol(all_derives = true)]
    interface IOrionAccessControl {
        function canRequestDeposit(address sender) external view returns (bool);
    }
);
