//! ERC-8004 contract bindings.
//!
//! Declared from the public registry interfaces. Write operations are
//! always exercised in two phases (simulate via `eth_call`, then submit);
//! the events carry the step output identifiers as indexed topics.

use alloy::sol;

sol! {
    /// Identity Registry: agent ids, domains and addresses.
    #[sol(rpc)]
    contract IdentityRegistry {
        event AgentRegistered(uint256 indexed agentId, string agentDomain, address agentAddress);
        event AgentUpdated(uint256 indexed agentId, string agentDomain, address agentAddress);

        struct AgentInfo {
            uint256 agentId;
            string agentDomain;
            address agentAddress;
        }

        function getAgent(uint256 agentId) external view returns (AgentInfo memory agentInfo);
        function resolveByDomain(string calldata agentDomain) external view returns (AgentInfo memory agentInfo);
        function resolveByAddress(address agentAddress) external view returns (AgentInfo memory agentInfo);
        function getAgentCount() external view returns (uint256 count);
        function agentExists(uint256 agentId) external view returns (bool exists);
        function REGISTRATION_FEE() external pure returns (uint256 fee);
        function newAgent(string calldata agentDomain, address agentAddress) external payable returns (uint256 agentId);
    }
}

sol! {
    /// Reputation Registry: feedback authorizations between agent pairs.
    #[sol(rpc)]
    contract ReputationRegistry {
        event AuthFeedback(uint256 indexed agentClientId, uint256 indexed agentServerId, bytes32 indexed feedbackAuthId);

        function isFeedbackAuthorized(uint256 agentClientId, uint256 agentServerId) external view returns (bool isAuthorized, bytes32 feedbackAuthId);
        function getFeedbackAuthId(uint256 agentClientId, uint256 agentServerId) external view returns (bytes32 feedbackAuthId);
        function acceptFeedback(uint256 agentClientId, uint256 agentServerId) external;
    }
}

sol! {
    /// Validation Registry: data-hash keyed validation requests.
    #[sol(rpc)]
    contract ValidationRegistry {
        event ValidationRequestEvent(uint256 indexed agentValidatorId, uint256 indexed agentServerId, bytes32 indexed dataHash);
        event ValidationResponseEvent(uint256 indexed agentValidatorId, uint256 indexed agentServerId, bytes32 indexed dataHash, uint8 response);

        struct Request {
            uint256 agentValidatorId;
            uint256 agentServerId;
            bytes32 dataHash;
            uint256 timestamp;
            bool responded;
        }

        function getValidationRequest(bytes32 dataHash) external view returns (Request memory request);
        function isValidationPending(bytes32 dataHash) external view returns (bool exists, bool pending);
        function validationRequest(uint256 agentValidatorId, uint256 agentServerId, bytes32 dataHash) external;
    }
}
