//! Solidity ABI surface of the deployed contracts
//!
//! Only the functions and events this client calls are declared. The
//! contracts themselves are deployed and owned elsewhere.

use alloy_sol_types::sol;

sol! {
    /// Per-account permission flags stored by the ERC721 template
    struct Roles {
        bool manager;
        bool deployERC20;
        bool updateMetadata;
        bool store;
    }

    // ------------------------------------------------------------------
    // ERC721Factory
    // ------------------------------------------------------------------

    event NFTCreated(
        address indexed newTokenAddress,
        address indexed templateAddress,
        string tokenName,
        address admin,
        string symbol,
        string tokenURI
    );

    function deployERC721Contract(
        string memory name,
        string memory symbol,
        uint256 _templateIndex,
        address additionalERC20Deployer,
        string memory _tokenURI
    ) external returns (address);

    function getCurrentNFTCount() external view returns (uint256);

    function getCurrentTokenCount() external view returns (uint256);

    // ------------------------------------------------------------------
    // ERC721Template
    // ------------------------------------------------------------------

    event TokenCreated(
        address indexed newTokenAddress,
        address indexed templateAddress,
        string name,
        string symbol,
        uint256 cap,
        address creator
    );

    function name() external view returns (string memory);
    function symbol() external view returns (string memory);
    function ownerOf(uint256 tokenId) external view returns (address);
    function tokenURI(uint256 tokenId) external view returns (string memory);
    function setTokenURI(uint256 tokenId, string memory _tokenURI) external;

    function getPermissions(address user) external view returns (Roles memory);
    function isERC20Deployer(address account) external view returns (bool);

    function addManager(address _managerAddress) external;
    function removeManager(address _managerAddress) external;
    function addToCreateERC20List(address _allowedAddress) external;
    function removeFromCreateERC20List(address _allowedAddress) external;
    function addToMetadataList(address _allowedAddress) external;
    function removeFromMetadataList(address _allowedAddress) external;
    function addTo725StoreList(address _allowedAddress) external;
    function removeFrom725StoreList(address _allowedAddress) external;
    function cleanPermissions() external;

    function transferFrom(address from, address to, uint256 tokenId) external;
    function safeTransferFrom(address from, address to, uint256 tokenId) external;

    function createERC20(
        uint256 _templateIndex,
        string[] calldata strings,
        address[] calldata addresses,
        uint256[] calldata uints,
        bytes[] calldata bytess
    ) external returns (address);

    function setNewData(bytes32 _key, bytes calldata _value) external;
    function getData(bytes32 _key) external view returns (bytes memory);
    function setMetaDataState(uint8 _metaDataState) external;
}
